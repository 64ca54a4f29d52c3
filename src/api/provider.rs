//! Remote website API trait

use async_trait::async_trait;

use super::types::{ApiError, ApiWebsite};

/// Backend operations the website store depends on.
///
/// `ZukiiClient` is the HTTP implementation; tests plug in scripted fakes.
#[async_trait]
pub trait WebsiteApi: Send + Sync {
    /// `GET /websites`
    async fn list_websites(&self) -> Result<Vec<ApiWebsite>, ApiError>;

    /// `POST /websites`
    async fn create_website(&self, url: &str, name: &str) -> Result<ApiWebsite, ApiError>;

    /// `GET /websites/:id`
    async fn get_website(&self, id: &str) -> Result<ApiWebsite, ApiError>;

    /// `DELETE /websites/:id`
    async fn delete_website(&self, id: &str) -> Result<(), ApiError>;
}
