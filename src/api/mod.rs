//! Remote website API

pub mod client;
pub mod provider;
pub mod types;

pub use client::{ZukiiClient, DEFAULT_API_BASE};
pub use provider::WebsiteApi;
pub use types::{ApiError, ApiWebsite};
