//! Data models
//!
//! Read-only snapshots of the CMS content model:
//! - Collection types (Article, Category) with their relations (Author, Media)
//! - Single types (Homepage, Global) composed of section components
//! - Response envelopes shared by every endpoint

mod article;
mod category;
pub mod envelope;
mod media;
mod sections;

pub use article::{Article, Author, Block};
pub use category::Category;
pub use envelope::{ListResponse, Meta, Pagination, SingleResponse};
pub use media::Media;
pub use sections::{
    CollectionSection, FooterSection, GlobalContent, HeroSection, HomepageContent, NavigationLabels, Seo,
};
