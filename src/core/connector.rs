use crate::adapters::http::CartaClient;
use crate::core::investor::InvestorSyncer;
use crate::core::issuer::IssuerSyncer;
use crate::core::portfolio::PortfolioSyncer;
use crate::domain::ports::{ConfigProvider, ResourceSyncer};
use crate::domain::resource::ConnectorMetadata;
use crate::utils::error::Result;
use std::time::Duration;

pub struct CartaConnector {
    client: CartaClient,
    page_size: u32,
}

impl CartaConnector {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = CartaClient::with_timeout(
            config.base_url(),
            config.access_token(),
            Duration::from_secs(config.request_timeout_secs()),
        )?;

        Ok(Self::from_client(client, config.page_size()))
    }

    pub fn from_client(client: CartaClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "Carta".to_string(),
            description: Some("Issuers, investor firms and portfolios from Carta".to_string()),
        }
    }

    /// Credentials are only exercised by the first listing call.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }

    pub fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
        vec![
            Box::new(IssuerSyncer::new(self.client.clone(), self.page_size)),
            Box::new(InvestorSyncer::new(self.client.clone(), self.page_size)),
            Box::new(PortfolioSyncer::new(self.client.clone(), self.page_size)),
        ]
    }
}
