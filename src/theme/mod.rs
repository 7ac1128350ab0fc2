//! Theme engine
//!
//! Server-side rendering of the storefront pages using Tera.
//! Features:
//! - Built-in templates compiled into the binary
//! - Optional override directory (same template names win)
//! - Bundled static assets (stylesheet, hero artwork)
//! - Plain HTML error page when a template fails

use anyhow::{Context, Result};
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

mod error;


pub use error::ThemeError;

/// Templates shipped with the server, keyed by template name
const BUILTIN_TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("templates/base.html")),
    ("home.html", include_str!("templates/home.html")),
    ("blog.html", include_str!("templates/blog.html")),
    ("article.html", include_str!("templates/article.html")),
    ("not_found.html", include_str!("templates/not_found.html")),
];

/// A static file served under `/assets/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub content_type: &'static str,
    pub body: &'static [u8],
}

/// Look up a bundled asset by its file name
pub fn asset(name: &str) -> Option<Asset> {
    match name {
        "site.css" => Some(Asset {
            content_type: "text/css; charset=utf-8",
            body: include_bytes!("assets/site.css"),
        }),
        "hero-watch.svg" => Some(Asset {
            content_type: "image/svg+xml",
            body: include_bytes!("assets/hero-watch.svg"),
        }),
        _ => None,
    }
}

/// Theme engine for rendering storefront pages
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Create the engine from the built-in templates
    ///
    /// # Arguments
    /// * `overrides` - Optional directory whose `.html` files replace or
    ///   extend the built-in templates (names are relative paths)
    pub fn new(overrides: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(BUILTIN_TEMPLATES.to_vec())
            .map_err(|e| ThemeError::TemplateError(format!("Failed to load built-in templates: {}", e)))?;

        if let Some(dir) = overrides {
            if !dir.is_dir() {
                return Err(ThemeError::NotFound(dir.display().to_string()).into());
            }
            Self::add_templates_from_dir(&mut tera, dir, dir)?;
            tracing::info!("Loaded template overrides from {:?}", dir);
        }

        tracing::debug!("Theme engine ready with {} templates", tera.get_template_names().count());

        Ok(Self { tera })
    }

    /// Recursively add templates from a directory with relative names
    fn add_templates_from_dir(tera: &mut Tera, base_path: &Path, current_path: &Path) -> Result<()> {
        for entry in fs::read_dir(current_path).map_err(ThemeError::from)? {
            let path = entry.map_err(ThemeError::from)?.path();

            if path.is_dir() {
                Self::add_templates_from_dir(tera, base_path, &path)?;
            } else if path.extension().is_some_and(|ext| ext == "html") {
                let relative_path = path
                    .strip_prefix(base_path)
                    .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;

                // Forward slashes on every platform
                let template_name = relative_path.to_string_lossy().replace('\\', "/");

                let content =
                    fs::read_to_string(&path).with_context(|| format!("Failed to read template: {:?}", path))?;

                tera.add_raw_template(&template_name, &content).map_err(|e| {
                    ThemeError::TemplateError(format!("Failed to add template {}: {}", template_name, e))
                })?;
            }
        }

        Ok(())
    }

    /// Render a template with context
    ///
    /// # Arguments
    /// * `template` - Template name (e.g., "home.html", "article.html")
    /// * `context` - Tera context with template variables
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ThemeError> {
        self.tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            ThemeError::TemplateError(error_msg)
        })
    }

    /// Render a template, returning a plain error page if it fails
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("{}", e);
                Self::simple_error_page(template, &e.to_string())
            }
        }
    }

    /// Whether a template with this name is loaded
    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }

    /// Last-resort page when rendering fails
    fn simple_error_page(template: &str, error: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Template Error</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
        }}
        h1 {{ color: #c9a24a; }}
        pre {{ white-space: pre-wrap; color: #666; }}
    </style>
</head>
<body>
    <h1>Something went wrong</h1>
    <p>The page <code>{}</code> could not be rendered.</p>
    <pre>{}</pre>
</body>
</html>"#,
            escape(template),
            escape(error)
        )
    }
}

fn escape(s: &str) -> String {
    tera::escape_html(s)
}
