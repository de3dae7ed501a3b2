pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;

use crate::error::BackendError;

/// Something that turns a user query into an answer string.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, query: &str) -> Result<String, BackendError>;
}
