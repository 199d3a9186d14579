use crate::core::connector::CartaConnector;
use crate::domain::ports::{ConfigProvider, Pipeline, ResourceSyncer, Storage};
use crate::domain::resource::{Entitlement, Grant, Resource};
use crate::domain::sync::{SyncManifest, SyncOutput, SyncSnapshot};
use crate::utils::error::{ConnectorError, Result};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const OUTPUT_ARCHIVE: &str = "sync_output.zip";

/// Drains every registered syncer and writes the resulting graph as one archive.
pub struct SyncPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    connector_name: String,
    syncers: Vec<Box<dyn ResourceSyncer>>,
}

impl<S: Storage, C: ConfigProvider> SyncPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let connector = CartaConnector::new(&config)?;
        Ok(Self::with_connector(storage, config, &connector))
    }

    pub fn with_connector(storage: S, config: C, connector: &CartaConnector) -> Self {
        Self {
            storage,
            config,
            connector_name: connector.metadata().display_name,
            syncers: connector.resource_syncers(),
        }
    }

    fn syncers_for<'a>(
        &'a self,
        resources: &'a [Resource],
    ) -> impl Iterator<Item = (&'a dyn ResourceSyncer, &'a Resource)> + 'a {
        self.syncers.iter().flat_map(move |syncer| {
            resources
                .iter()
                .filter(move |resource| resource.id.resource_type == syncer.resource_type().id)
                .map(move |resource| (syncer.as_ref(), resource))
        })
    }
}

async fn drain_resources(syncer: &dyn ResourceSyncer) -> Result<Vec<Resource>> {
    let mut resources = Vec::new();
    let mut token = String::new();
    let mut pages = 0usize;

    loop {
        let (page, next) = syncer.list(None, &token).await?;
        pages += 1;
        tracing::debug!(
            "{}: page {} returned {} resources",
            syncer.resource_type().id,
            pages,
            page.len()
        );
        resources.extend(page);

        if next.is_empty() {
            break;
        }
        token = next;
    }

    Ok(resources)
}

async fn drain_entitlements(
    syncer: &dyn ResourceSyncer,
    resource: &Resource,
) -> Result<Vec<Entitlement>> {
    let mut entitlements = Vec::new();
    let mut token = String::new();
    loop {
        let (page, next) = syncer.entitlements(resource, &token).await?;
        entitlements.extend(page);
        if next.is_empty() {
            return Ok(entitlements);
        }
        token = next;
    }
}

async fn drain_grants(syncer: &dyn ResourceSyncer, resource: &Resource) -> Result<Vec<Grant>> {
    let mut grants = Vec::new();
    let mut token = String::new();
    loop {
        let (page, next) = syncer.grants(resource, &token).await?;
        grants.extend(page);
        if next.is_empty() {
            return Ok(grants);
        }
        token = next;
    }
}

pub fn render_grants_csv(grants: &[Grant]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["entitlement_id", "principal_type", "principal_id"])?;
    for grant in grants {
        writer.write_record([
            grant.entitlement_id.as_str(),
            grant.principal.resource_type.as_str(),
            grant.principal.resource.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConnectorError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ConnectorError::Processing {
        message: format!("grants CSV is not valid UTF-8: {}", e),
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SyncPipeline<S, C> {
    async fn extract(&self) -> Result<SyncSnapshot> {
        let mut snapshot = SyncSnapshot::default();

        for syncer in &self.syncers {
            let resources = drain_resources(syncer.as_ref()).await?;
            tracing::info!(
                "Listed {} {} resources",
                resources.len(),
                syncer.resource_type().display_name
            );
            snapshot.resources.extend(resources);
        }

        Ok(snapshot)
    }

    async fn transform(&self, snapshot: SyncSnapshot) -> Result<SyncOutput> {
        let mut entitlements = Vec::new();
        let mut grants = Vec::new();

        for (syncer, resource) in self.syncers_for(&snapshot.resources) {
            entitlements.extend(drain_entitlements(syncer, resource).await?);
            grants.extend(drain_grants(syncer, resource).await?);
        }

        let grants_csv = render_grants_csv(&grants)?;
        let manifest = SyncManifest {
            connector: self.connector_name.clone(),
            resource_count: snapshot.resources.len(),
            entitlement_count: entitlements.len(),
            grant_count: grants.len(),
            synced_at: chrono::Utc::now(),
        };

        Ok(SyncOutput {
            resources: snapshot.resources,
            entitlements,
            grants,
            grants_csv,
            manifest,
        })
    }

    async fn load(&self, output: SyncOutput) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), OUTPUT_ARCHIVE);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            zip.start_file("resources.json", SimpleFileOptions::default())?;
            zip.write_all(&serde_json::to_vec_pretty(&output.resources)?)?;

            zip.start_file("entitlements.json", SimpleFileOptions::default())?;
            zip.write_all(&serde_json::to_vec_pretty(&output.entitlements)?)?;

            zip.start_file("grants.csv", SimpleFileOptions::default())?;
            zip.write_all(output.grants_csv.as_bytes())?;

            zip.start_file("manifest.json", SimpleFileOptions::default())?;
            zip.write_all(&serde_json::to_vec_pretty(&output.manifest)?)?;

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing sync archive ({} bytes) to storage", zip_data.len());
        self.storage.write_file(OUTPUT_ARCHIVE, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::CartaClient;
    use crate::domain::resource::ResourceId;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ConnectorError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        base_url: String,
    }

    impl ConfigProvider for MockConfig {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn access_token(&self) -> &str {
            "test-token"
        }

        fn page_size(&self) -> u32 {
            100
        }

        fn output_path(&self) -> &str {
            "test_output"
        }
    }

    fn pipeline_for(server: &MockServer, storage: MockStorage) -> SyncPipeline<MockStorage, MockConfig> {
        let config = MockConfig {
            base_url: server.url("/v1alpha1/"),
        };
        let client = CartaClient::new(config.base_url(), config.access_token()).unwrap();
        let connector = CartaConnector::from_client(client, config.page_size());
        SyncPipeline::with_connector(storage, config, &connector)
    }

    fn mock_small_tenant(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/v1alpha1/issuers/i1");
            then.status(200)
                .json_body(serde_json::json!({"issuer": {"id": "i1", "legalName": "Acme"}}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1alpha1/issuers");
            then.status(200).json_body(serde_json::json!({
                "issuers": [{"id": "i1", "legalName": "Acme"}]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1alpha1/investors/firms");
            then.status(200).json_body(serde_json::json!({
                "firms": [{"id": "f1", "name": "Seed Partners"}]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1alpha1/portfolios/p1/issuers");
            then.status(200)
                .json_body(serde_json::json!({"issuers": [{"id": "i1"}]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1alpha1/portfolios");
            then.status(200).json_body(serde_json::json!({
                "portfolios": [{"id": "p1", "legalName": "Fund I"}]
            }));
        });
    }

    #[tokio::test]
    async fn test_extract_lists_every_resource_type() {
        let server = MockServer::start();
        mock_small_tenant(&server);

        let snapshot = pipeline_for(&server, MockStorage::new())
            .extract()
            .await
            .unwrap();

        let ids: Vec<String> = snapshot.resources.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["issuer:i1", "investor:f1", "portfolio:p1"]);
    }

    #[tokio::test]
    async fn test_transform_builds_membership_grants() {
        let server = MockServer::start();
        mock_small_tenant(&server);
        let pipeline = pipeline_for(&server, MockStorage::new());

        let snapshot = pipeline.extract().await.unwrap();
        let output = pipeline.transform(snapshot).await.unwrap();

        assert_eq!(output.entitlements.len(), 1);
        assert_eq!(output.grants.len(), 1);
        assert_eq!(output.grants[0].principal, ResourceId::new("issuer", "i1"));
        assert_eq!(output.manifest.resource_count, 3);
        assert_eq!(output.manifest.connector, "Carta");
        assert_eq!(
            output.grants_csv,
            "entitlement_id,principal_type,principal_id\nportfolio:p1:member,issuer,i1\n"
        );
    }

    #[tokio::test]
    async fn test_extract_fails_on_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1alpha1/issuers");
            then.status(503);
        });

        let err = pipeline_for(&server, MockStorage::new())
            .extract()
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_load_writes_archive() {
        let server = MockServer::start();
        mock_small_tenant(&server);
        let storage = MockStorage::new();
        let pipeline = pipeline_for(&server, storage.clone());

        let snapshot = pipeline.extract().await.unwrap();
        let output = pipeline.transform(snapshot).await.unwrap();
        let output_path = pipeline.load(output).await.unwrap();

        assert_eq!(output_path, "test_output/sync_output.zip");

        let zip_bytes = storage.get_file(OUTPUT_ARCHIVE).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();

        assert_eq!(
            file_names,
            vec!["entitlements.json", "grants.csv", "manifest.json", "resources.json"]
        );
    }

    #[test]
    fn test_render_grants_csv_header_only() {
        assert_eq!(
            render_grants_csv(&[]).unwrap(),
            "entitlement_id,principal_type,principal_id\n"
        );
    }
}
