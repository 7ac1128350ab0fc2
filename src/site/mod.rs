//! Presentation view-models
//!
//! Each section of the storefront resolves from optional CMS content into a
//! fully populated view. Missing content never fails a page: every view falls
//! back to the storefront's own copy.

use serde::Serialize;

use crate::client::{format_date, media_url};
use crate::models::{
    Article, Block, CollectionSection, FooterSection, GlobalContent, HeroSection, Media, NavigationLabels,
};
use crate::services::MarkdownRenderer;

/// Site name used when the CMS does not provide one
pub const DEFAULT_SITE_NAME: &str = "Kick Off Couture";

/// Hero background bundled with the server
pub const DEFAULT_HERO_IMAGE: &str = "/assets/hero-watch.svg";

/// Split a brand name into its first word and the remainder,
/// which the navbar and footer style differently.
pub fn split_brand(name: &str) -> (String, String) {
    let mut words = name.split(' ');
    let first = words.next().unwrap_or_default().to_string();
    let rest = words.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Hero section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroView {
    pub badge: String,
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub background_image: String,
}

impl HeroView {
    /// Copy shown when the homepage has no hero
    pub fn fallback() -> Self {
        Self {
            badge: "Swiss Precision Craftsmanship".to_string(),
            title: "Where Football Meets Timeless Elegance".to_string(),
            subtitle: "Each timepiece is a masterpiece, celebrating legendary clubs with Swiss precision and iconic team heritage".to_string(),
            cta_text: "Discover the Collection".to_string(),
            cta_link: "#collection".to_string(),
            background_image: DEFAULT_HERO_IMAGE.to_string(),
        }
    }

    pub fn resolve(hero: Option<&HeroSection>, media_base: &str) -> Self {
        let Some(hero) = hero else {
            return Self::fallback();
        };

        let background_image = hero
            .background_image
            .as_ref()
            .filter(|m| m.has_url())
            .map(|m| media_url(media_base, &m.url))
            .unwrap_or_else(|| DEFAULT_HERO_IMAGE.to_string());

        Self {
            badge: hero.badge.clone(),
            title: hero.title.clone(),
            subtitle: hero.subtitle.clone(),
            cta_text: hero.cta_text.clone(),
            cta_link: hero.cta_link.clone(),
            background_image,
        }
    }
}

/// Navigation bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavbarView {
    pub site_name: String,
    pub brand_first: String,
    pub brand_rest: String,
    pub labels: NavigationLabels,
    pub login_url: String,
    pub cart_url: String,
}

impl NavbarView {
    pub fn resolve(global: Option<&GlobalContent>, login_url: &str, cart_url: &str) -> Self {
        let site_name = global
            .and_then(|g| g.site_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_SITE_NAME)
            .to_string();
        let labels = global
            .and_then(|g| g.navigation_labels.clone())
            .unwrap_or_default();
        let (brand_first, brand_rest) = split_brand(&site_name);

        Self {
            site_name,
            brand_first,
            brand_rest,
            labels,
            login_url: login_url.to_string(),
            cart_url: cart_url.to_string(),
        }
    }
}

/// Collection section heading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView {
    pub badge: String,
    pub title: String,
    pub description: String,
}

impl CollectionView {
    pub fn resolve(section: Option<&CollectionSection>) -> Self {
        let section = section.cloned().unwrap_or_default();
        Self {
            badge: section.badge,
            title: section.title,
            description: section.description,
        }
    }
}

/// Footer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FooterView {
    pub brand_first: String,
    pub brand_rest: String,
    pub tagline: String,
    pub copyright_text: String,
}

impl FooterView {
    pub fn resolve(footer: Option<&FooterSection>) -> Self {
        let footer = footer.cloned().unwrap_or_default();
        let (brand_first, brand_rest) = split_brand(&footer.brand_name);
        Self {
            brand_first,
            brand_rest,
            tagline: footer.tagline,
            copyright_text: footer.copyright_text,
        }
    }
}

// ============================================================================
// Language switcher
// ============================================================================

/// Cookie carrying the selected locale
pub const LOCALE_COOKIE: &str = "locale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

/// Languages offered by the switcher; the first one is the default
pub const LANGUAGES: [Language; 5] = [
    Language { code: "en", name: "English", flag: "\u{1F1EC}\u{1F1E7}" },
    Language { code: "it", name: "Italiano", flag: "\u{1F1EE}\u{1F1F9}" },
    Language { code: "es", name: "Espa\u{f1}ol", flag: "\u{1F1EA}\u{1F1F8}" },
    Language { code: "fr", name: "Fran\u{e7}ais", flag: "\u{1F1EB}\u{1F1F7}" },
    Language { code: "de", name: "Deutsch", flag: "\u{1F1E9}\u{1F1EA}" },
];

/// Language for a locale code; unknown codes resolve to English
pub fn resolve_language(code: Option<&str>) -> Language {
    code.map(str::trim)
        .and_then(|code| LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code)))
        .copied()
        .unwrap_or(LANGUAGES[0])
}

/// Read the locale from a `Cookie` header value
pub fn locale_from_cookie(cookie_header: Option<&str>) -> Option<&str> {
    cookie_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == LOCALE_COOKIE)
        .map(|(_, value)| value.trim())
}

/// `Set-Cookie` value persisting a locale for a year
pub fn locale_cookie(code: &str) -> String {
    format!("{}={}; Path=/; Max-Age=31536000; SameSite=Lax", LOCALE_COOKIE, code)
}

/// Language switcher state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageSwitcher {
    pub current: Language,
    pub languages: Vec<Language>,
}

impl LanguageSwitcher {
    pub fn new(code: Option<&str>) -> Self {
        Self {
            current: resolve_language(code),
            languages: LANGUAGES.to_vec(),
        }
    }

    pub fn locale(&self) -> &'static str {
        self.current.code
    }
}

// ============================================================================
// Blog
// ============================================================================

/// Image ready for an `<img>` tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    fn resolve(media: Option<&Media>, media_base: &str) -> Option<Self> {
        media.filter(|m| m.has_url()).map(|m| Self {
            url: media_url(media_base, &m.url),
            alt: m.alt().to_string(),
        })
    }
}

/// Article teaser on the blog index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleCard {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub date: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub cover: Option<ImageView>,
}

impl ArticleCard {
    pub fn resolve(article: &Article, media_base: &str) -> Self {
        Self {
            title: article.title.clone(),
            slug: article.slug.clone(),
            description: article.description.clone().unwrap_or_default(),
            date: article.display_date().map(format_date).unwrap_or_default(),
            category: article.category.as_ref().map(|c| c.name.clone()),
            author: article.author.as_ref().map(|a| a.name.clone()),
            cover: ImageView::resolve(article.cover.as_ref(), media_base),
        }
    }
}

/// Rendered entry of the article body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockView {
    RichText { html: String },
    Quote { title: Option<String>, body: String },
    Image { image: ImageView },
    Slider { images: Vec<ImageView> },
}

/// Full article page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleView {
    pub card: ArticleCard,
    pub author_avatar: Option<ImageView>,
    pub blocks: Vec<BlockView>,
}

impl ArticleView {
    pub fn resolve(article: &Article, media_base: &str, markdown: &MarkdownRenderer) -> Self {
        let blocks = article
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::RichText { body } => Some(BlockView::RichText {
                    html: markdown.render(body),
                }),
                Block::Quote { title, body } => Some(BlockView::Quote {
                    title: title.clone().filter(|t| !t.is_empty()),
                    body: body.clone().unwrap_or_default(),
                }),
                Block::File { file } => {
                    ImageView::resolve(file.as_ref(), media_base).map(|image| BlockView::Image { image })
                }
                Block::Slider { files } => {
                    let images: Vec<_> = files
                        .iter()
                        .filter_map(|f| ImageView::resolve(Some(f), media_base))
                        .collect();
                    (!images.is_empty()).then_some(BlockView::Slider { images })
                }
                Block::Unsupported => None,
            })
            .collect();

        Self {
            card: ArticleCard::resolve(article, media_base),
            author_avatar: article
                .author
                .as_ref()
                .and_then(|a| ImageView::resolve(a.avatar.as_ref(), media_base)),
            blocks,
        }
    }
}
