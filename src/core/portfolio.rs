use crate::adapters::http::CartaClient;
use crate::core::issuer::issuer_resource;
use crate::core::listing_failed;
use crate::core::pagination::ContinuationState;
use crate::domain::model::{PaginationParams, Portfolio};
use crate::domain::ports::{ResourceSyncer, SyncPage};
use crate::domain::resource::{
    Entitlement, Grant, PortfolioProfile, Resource, ResourceId, ResourceType,
    RESOURCE_TYPE_ISSUER, RESOURCE_TYPE_PORTFOLIO,
};
use crate::utils::error::{ConnectorError, Result};
use async_trait::async_trait;

pub const MEMBER_ENTITLEMENT: &str = "member";

/// Builds the group resource for a portfolio; issuer ids must already be aggregated.
pub fn portfolio_resource(portfolio: &Portfolio) -> Resource {
    let profile = PortfolioProfile {
        portfolio_legal_name: portfolio.name.clone(),
        portfolio_id: portfolio.id.clone(),
        portfolio_issuer_ids: portfolio.issuer_ids.clone(),
    };

    Resource::new_group(
        portfolio.name.clone(),
        &RESOURCE_TYPE_PORTFOLIO,
        portfolio.id.clone(),
        profile,
    )
}

#[derive(Debug, Clone)]
pub struct PortfolioSyncer {
    client: CartaClient,
    page_size: u32,
}

impl PortfolioSyncer {
    pub fn new(client: CartaClient, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl ResourceSyncer for PortfolioSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &RESOURCE_TYPE_PORTFOLIO
    }

    /// Portfolios are top-level groups, so `parent` is not attached.
    async fn list(&self, _parent: Option<&ResourceId>, token: &str) -> Result<SyncPage<Resource>> {
        let mut state = ContinuationState::parse(token)?;
        let params =
            PaginationParams::new(self.page_size, state.cursor(RESOURCE_TYPE_PORTFOLIO.id));

        let page = self
            .client
            .get_portfolios(&params)
            .await
            .map_err(|e| listing_failed("portfolios", e))?;

        let next_token = state.advance(RESOURCE_TYPE_PORTFOLIO.id, &page.next)?;
        let resources = page.items.iter().map(portfolio_resource).collect();

        Ok((resources, next_token))
    }

    async fn entitlements(&self, resource: &Resource, _token: &str) -> Result<SyncPage<Entitlement>> {
        let membership = Entitlement::assignment(
            resource,
            MEMBER_ENTITLEMENT,
            format!("{} Portfolio {}", resource.display_name, MEMBER_ENTITLEMENT),
            format!("Access to {} portfolio in Carta", resource.display_name),
            &[&RESOURCE_TYPE_ISSUER],
        );

        Ok((vec![membership], String::new()))
    }

    async fn grants(&self, resource: &Resource, _token: &str) -> Result<SyncPage<Grant>> {
        let profile = resource
            .group_profile()
            .ok_or_else(|| ConnectorError::Processing {
                message: format!("resource {} has no portfolio profile", resource.id),
            })?;

        let mut grants = Vec::with_capacity(profile.portfolio_issuer_ids.len());
        for issuer_id in &profile.portfolio_issuer_ids {
            let issuer = self.client.get_issuer(issuer_id).await?;
            let principal = issuer_resource(&issuer, None);
            grants.push(Grant::new(resource, MEMBER_ENTITLEMENT, principal.id));
        }

        Ok((grants, String::new()))
    }
}
