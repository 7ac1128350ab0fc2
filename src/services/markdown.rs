//! Markdown rendering service
//!
//! Rich-text blocks arrive from the CMS as Markdown. They are rendered with
//! pulldown-cmark; raw HTML in the source is escaped rather than passed
//! through, and relative image sources are resolved against the media base.
//!
//! # Example
//!
//! ```
//! use kickoff::services::markdown::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let html = renderer.render("# Hello World\n\nThis is **bold** text.");
//! assert!(html.contains("<h1>"));
//! assert!(html.contains("<strong>"));
//! ```

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Markdown renderer for CMS rich text
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    media_base: Option<String>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative image sources (`/uploads/...`) against `media_base`
    pub fn with_media_base(media_base: impl Into<String>) -> Self {
        let base = media_base.into().trim_end_matches('/').to_string();
        Self {
            media_base: (!base.is_empty()).then_some(base),
        }
    }

    /// Renders Markdown text to HTML.
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let parser = Parser::new_ext(markdown, options);
        let events = self.process_events(parser);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn process_events<'a>(&self, parser: Parser<'a>) -> Vec<Event<'a>> {
        let mut events = Vec::new();
        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_content.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    events.push(Event::Html(code_block(&code_content, code_lang.as_deref()).into()));
                    code_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_content.push_str(&text);
                }
                // Editors can type raw HTML into rich text; show it as text
                Event::Html(raw) | Event::InlineHtml(raw) => {
                    events.push(Event::Text(raw));
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url: self.resolve(dest_url),
                        title,
                        id,
                    }));
                }
                _ => {
                    events.push(event);
                }
            }
        }

        events
    }

    fn resolve<'a>(&self, url: CowStr<'a>) -> CowStr<'a> {
        match &self.media_base {
            Some(base) if url.starts_with('/') && !url.starts_with("//") => format!("{}{}", base, url).into(),
            _ => url,
        }
    }
}

fn code_block(code: &str, lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            html_escape(lang),
            html_escape(code)
        ),
        None => format!("<pre><code>{}</code></pre>", html_escape(code)),
    }
}

/// Escapes HTML special characters in a string.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
