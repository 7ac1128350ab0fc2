//! Upstream query construction
//!
//! Every proxied resource forwards a fixed query shape to the CMS. Keys keep
//! their bracket syntax (`pagination[page]`, `filters[slug][$eq]`) and are
//! emitted literally; values are percent-encoded.

use std::fmt;

/// Ordered list of upstream query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmsQuery {
    params: Vec<(String, String)>,
}

impl CmsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Append a parameter only when a value is present
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Look up the first value of a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for CmsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", key, encode_value(value))?;
        }
        Ok(())
    }
}

/// Percent-encode a value, leaving the wildcard and sort separator readable
fn encode_value(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%2A", "*")
        .replace("%3A", ":")
}

/// A request against one CMS collection or single type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsRequest {
    /// Path below the CMS base URL, e.g. `/api/articles`
    pub path: String,
    pub query: CmsQuery,
}

impl CmsRequest {
    pub fn new(path: impl Into<String>, query: CmsQuery) -> Self {
        Self { path: path.into(), query }
    }

    /// Paginated article list, newest first, optionally narrowed to a category
    pub fn articles(locale: &str, page: u32, page_size: u32, category: Option<&str>) -> Self {
        let query = CmsQuery::new()
            .param("locale", locale)
            .param("populate", "*")
            .param("pagination[page]", page)
            .param("pagination[pageSize]", page_size)
            .param("sort", "publishedAt:desc")
            .param_opt("filters[category][slug][$eq]", category);
        Self::new("/api/articles", query)
    }

    /// Article lookup by slug with cover, author avatar, category and blocks populated
    pub fn article_by_slug(locale: &str, slug: &str) -> Self {
        let query = CmsQuery::new()
            .param("locale", locale)
            .param("filters[slug][$eq]", slug)
            .param("populate[cover]", "*")
            .param("populate[author][populate]", "avatar")
            .param("populate[category]", "*")
            .param("populate[blocks]", "*");
        Self::new("/api/articles", query)
    }

    pub fn categories() -> Self {
        Self::new("/api/categories", CmsQuery::new().param("populate", "*"))
    }

    pub fn global(locale: &str) -> Self {
        let query = CmsQuery::new()
            .param("locale", locale)
            .param("populate[navigationLabels]", "*");
        Self::new("/api/global", query)
    }

    pub fn homepage(locale: &str) -> Self {
        let query = CmsQuery::new()
            .param("locale", locale)
            .param("populate[hero][populate]", "*")
            .param("populate[collectionSection]", "*")
            .param("populate[footer]", "*");
        Self::new("/api/homepage", query)
    }

    /// Path plus query string; also used as the response cache key
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    /// Absolute URL against a CMS base
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path_and_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_articles_query_shape() {
        let request = CmsRequest::articles("en", 2, 5, None);
        assert_eq!(
            request.path_and_query(),
            "/api/articles?locale=en&populate=*&pagination[page]=2&pagination[pageSize]=5&sort=publishedAt:desc"
        );
    }

    #[test]
    fn test_articles_query_with_category() {
        let request = CmsRequest::articles("it", 1, 10, Some("matchday"));
        assert!(request.path_and_query().ends_with("&filters[category][slug][$eq]=matchday"));
        assert_eq!(request.query.get("locale"), Some("it"));
    }

    #[test]
    fn test_article_by_slug_query_shape() {
        let request = CmsRequest::article_by_slug("en", "derby-day");
        assert_eq!(
            request.path_and_query(),
            "/api/articles?locale=en&filters[slug][$eq]=derby-day&populate[cover]=*&populate[author][populate]=avatar&populate[category]=*&populate[blocks]=*"
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let request = CmsRequest::article_by_slug("en", "a&b=c d");
        assert_eq!(request.query.get("filters[slug][$eq]"), Some("a&b=c d"));
        assert!(request.path_and_query().contains("filters[slug][$eq]=a%26b%3Dc%20d"));
    }

    #[test]
    fn test_single_type_queries() {
        assert_eq!(CmsRequest::categories().path_and_query(), "/api/categories?populate=*");
        assert_eq!(
            CmsRequest::global("fr").path_and_query(),
            "/api/global?locale=fr&populate[navigationLabels]=*"
        );
        assert!(CmsRequest::homepage("de").path_and_query().starts_with("/api/homepage?locale=de&"));
    }

    #[test]
    fn test_url_joins_base_without_double_slash() {
        let request = CmsRequest::categories();
        assert_eq!(
            request.url("https://cms.example.com/"),
            "https://cms.example.com/api/categories?populate=*"
        );
    }
}
