//! Kick Off Couture - storefront edge for a headless CMS
//!
//! This library provides the cached CMS proxy, the revalidation webhook,
//! the frontend data client and the server-rendered storefront pages.

pub mod api;
pub mod cache;
pub mod client;
pub mod cms;
pub mod config;
pub mod models;
pub mod services;
pub mod site;
pub mod theme;
