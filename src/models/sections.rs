//! Single types and their section components
//!
//! `homepage` and `global` are single-type records composed of reusable
//! components (hero, collection, footer, navigation labels, SEO). Every
//! component field falls back to the default configured on the CMS schema,
//! so a partially filled record still renders completely.

use serde::{Deserialize, Serialize};

use super::envelope::relation;
use super::Media;

/// `sections.hero`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroSection {
    pub badge: String,
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    #[serde(deserialize_with = "relation")]
    pub background_image: Option<Media>,
}

impl Default for HeroSection {
    fn default() -> Self {
        Self {
            badge: "Limited Edition".to_string(),
            title: "Where Football Passion Meets Horological Excellence".to_string(),
            subtitle: "Discover our exclusive collection of luxury timepieces inspired by legendary football clubs. Each watch is a masterpiece, limited to 100 pieces per edition.".to_string(),
            cta_text: "Explore Collection".to_string(),
            cta_link: "#collection".to_string(),
            background_image: None,
        }
    }
}

/// `sections.collection`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionSection {
    pub badge: String,
    pub title: String,
    pub description: String,
}

impl Default for CollectionSection {
    fn default() -> Self {
        Self {
            badge: "Limited Edition".to_string(),
            title: "The Collection".to_string(),
            description: "Each timepiece is a tribute to legendary clubs, crafted with Swiss precision and adorned with iconic team colors. Limited to 100 pieces per edition.".to_string(),
        }
    }
}

/// `sections.footer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterSection {
    pub brand_name: String,
    pub tagline: String,
    pub copyright_text: String,
}

impl Default for FooterSection {
    fn default() -> Self {
        Self {
            brand_name: "Kick Off Couture".to_string(),
            tagline: "Where football passion meets horological excellence".to_string(),
            copyright_text: "\u{00A9} 2025 Kick Off Couture. All rights reserved.".to_string(),
        }
    }
}

/// `shared.navigation-labels`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationLabels {
    pub collection: String,
    pub blog: String,
    pub login: String,
    pub cart: String,
}

impl Default for NavigationLabels {
    fn default() -> Self {
        Self {
            collection: "Collection".to_string(),
            blog: "Blog".to_string(),
            login: "Login".to_string(),
            cart: "Cart".to_string(),
        }
    }
}

/// `shared.seo`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default, deserialize_with = "relation")]
    pub share_image: Option<Media>,
}

/// `homepage` single type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageContent {
    #[serde(default)]
    pub hero: Option<HeroSection>,
    #[serde(default)]
    pub collection_section: Option<CollectionSection>,
    #[serde(default)]
    pub footer: Option<FooterSection>,
    #[serde(default)]
    pub seo: Option<Seo>,
}

/// `global` single type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalContent {
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub site_description: Option<String>,
    #[serde(default)]
    pub navigation_labels: Option<NavigationLabels>,
    #[serde(default)]
    pub default_seo: Option<Seo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_hero_uses_schema_defaults() {
        let hero: HeroSection = serde_json::from_value(json!({"title": "Matchday Edition"})).unwrap();

        assert_eq!(hero.title, "Matchday Edition");
        assert_eq!(hero.badge, "Limited Edition");
        assert_eq!(hero.cta_link, "#collection");
        assert!(hero.background_image.is_none());
    }

    #[test]
    fn test_hero_background_image_nested() {
        let hero: HeroSection = serde_json::from_value(json!({
            "backgroundImage": {"data": {"id": 7, "attributes": {"url": "/uploads/hero.jpg"}}}
        })).unwrap();

        assert_eq!(hero.background_image.map(|m| m.url), Some("/uploads/hero.jpg".to_string()));
    }

    #[test]
    fn test_homepage_missing_sections() {
        let homepage: HomepageContent = serde_json::from_value(json!({
            "id": 1,
            "footer": {"tagline": "Since 2025"}
        })).unwrap();

        assert!(homepage.hero.is_none());
        assert!(homepage.collection_section.is_none());
        let footer = homepage.footer.unwrap();
        assert_eq!(footer.tagline, "Since 2025");
        assert_eq!(footer.brand_name, "Kick Off Couture");
    }

    #[test]
    fn test_global_navigation_labels() {
        let global: GlobalContent = serde_json::from_value(json!({
            "siteName": "Kick Off Couture",
            "navigationLabels": {"blog": "Journal"}
        })).unwrap();

        let labels = global.navigation_labels.unwrap();
        assert_eq!(labels.blog, "Journal");
        assert_eq!(labels.cart, "Cart");
    }
}
