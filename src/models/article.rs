//! Article model
//!
//! Articles are the blog entries of the storefront. The CMS owns their
//! lifecycle; this crate only reads snapshots. Relations (cover, author,
//! category) and the `blocks` dynamic zone are optional and only present when
//! the upstream query populated them.

use serde::{Deserialize, Serialize};

use super::envelope::{relation, relation_list};
use super::{Category, Media};

/// Blog article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "relation")]
    pub cover: Option<Media>,
    #[serde(default, deserialize_with = "relation")]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "relation")]
    pub category: Option<Category>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Article {
    /// Publication date when published, creation date otherwise
    pub fn display_date(&self) -> Option<&str> {
        self.published_at.as_deref().or(self.created_at.as_deref())
    }
}

/// Article author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "relation")]
    pub avatar: Option<Media>,
}

/// Entry of the article `blocks` dynamic zone, tagged by `__component`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__component")]
pub enum Block {
    #[serde(rename = "shared.rich-text")]
    RichText {
        #[serde(default)]
        body: String,
    },
    #[serde(rename = "shared.quote")]
    Quote {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        body: Option<String>,
    },
    #[serde(rename = "shared.media")]
    File {
        #[serde(default, deserialize_with = "relation")]
        file: Option<Media>,
    },
    #[serde(rename = "shared.slider")]
    Slider {
        #[serde(default, deserialize_with = "relation_list")]
        files: Vec<Media>,
    },
    /// Components this storefront does not render
    #[serde(other)]
    Unsupported,
}
