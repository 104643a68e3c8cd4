//! Fetching engine resources

use async_trait::async_trait;

/// Reads a resource (the engine binary) by location
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> std::io::Result<Vec<u8>>;
}

/// Fetches resources from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

#[async_trait]
impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, location: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(location).await
    }
}
