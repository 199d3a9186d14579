use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting sync...");

        // Extract
        let snapshot = self.pipeline.extract().await?;
        tracing::info!("Extracted {} resources", snapshot.resources.len());

        // Transform
        let output = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "Built {} entitlements and {} grants",
            output.entitlements.len(),
            output.grants.len()
        );

        // Load
        let output_path = self.pipeline.load(output).await?;
        tracing::info!(
            "Sync finished in {:?}, output saved to: {}",
            started.elapsed(),
            output_path
        );

        Ok(output_path)
    }
}
