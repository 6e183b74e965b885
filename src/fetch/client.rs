use async_trait::async_trait;
use reqwest::{Request, Response};

/// Seam over the HTTP transport so data sources can be fetched through a stub in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
