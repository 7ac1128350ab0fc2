//! Services layer
//!
//! - `content`: read-through proxy semantics for every public resource
//! - `revalidation`: webhook event handling, cache invalidation and purge fan-out
//! - `purge`: CDN purge client
//! - `markdown`: rich-text rendering for the server-side pages

pub mod content;
pub mod markdown;
pub mod purge;
pub mod revalidation;

pub use content::{ArticleListParams, ContentService, DEFAULT_LOCALE};
pub use markdown::MarkdownRenderer;
pub use purge::{CdnPurger, PurgeError, PurgeReceipt, VercelPurger};
pub use revalidation::{
    fan_out, purge_urls, verify_secret, ContentModel, PurgeSummary, RevalidateError, RevalidateEvent,
    RevalidateResponse, RevalidationService,
};
