use crate::domain::resource::{Entitlement, Grant, Resource, ResourceId, ResourceType};
use crate::domain::sync::{SyncOutput, SyncSnapshot};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn access_token(&self) -> &str;
    /// Page size for top-level listings; 0 lets the server choose.
    fn page_size(&self) -> u32;
    fn output_path(&self) -> &str;
    fn request_timeout_secs(&self) -> u64 {
        30
    }
}

/// One page of a syncer call plus the opaque token for the next call.
pub type SyncPage<T> = (Vec<T>, String);

/// Per-resource-type listing interface consumed by the governance platform.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    fn resource_type(&self) -> &'static ResourceType;

    async fn list(&self, parent: Option<&ResourceId>, token: &str) -> Result<SyncPage<Resource>>;

    async fn entitlements(&self, resource: &Resource, token: &str) -> Result<SyncPage<Entitlement>>;

    async fn grants(&self, resource: &Resource, token: &str) -> Result<SyncPage<Grant>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SyncSnapshot>;
    async fn transform(&self, snapshot: SyncSnapshot) -> Result<SyncOutput>;
    async fn load(&self, output: SyncOutput) -> Result<String>;
}
