use crate::adapters::http::CartaClient;
use crate::core::listing_failed;
use crate::core::pagination::ContinuationState;
use crate::domain::model::{InvestorFirm, PaginationParams};
use crate::domain::ports::{ResourceSyncer, SyncPage};
use crate::domain::resource::{
    Entitlement, Grant, InvestorProfile, Resource, ResourceId, ResourceType, UserProfile,
    RESOURCE_TYPE_INVESTOR,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub fn investor_resource(investor: &InvestorFirm, parent: Option<&ResourceId>) -> Resource {
    let profile = UserProfile::Investor(InvestorProfile {
        login: investor.name.clone(),
        investor_id: investor.id.clone(),
    });

    Resource::new_user(
        investor.name.clone(),
        &RESOURCE_TYPE_INVESTOR,
        investor.id.clone(),
        profile,
        parent.cloned(),
    )
}

#[derive(Debug, Clone)]
pub struct InvestorSyncer {
    client: CartaClient,
    page_size: u32,
}

impl InvestorSyncer {
    pub fn new(client: CartaClient, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl ResourceSyncer for InvestorSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &RESOURCE_TYPE_INVESTOR
    }

    async fn list(&self, parent: Option<&ResourceId>, token: &str) -> Result<SyncPage<Resource>> {
        let mut state = ContinuationState::parse(token)?;
        let params = PaginationParams::new(self.page_size, state.cursor(RESOURCE_TYPE_INVESTOR.id));

        let page = self
            .client
            .get_investors(&params)
            .await
            .map_err(|e| listing_failed("investors", e))?;

        let next_token = state.advance(RESOURCE_TYPE_INVESTOR.id, &page.next)?;
        let resources = page
            .items
            .iter()
            .map(|investor| investor_resource(investor, parent))
            .collect();

        Ok((resources, next_token))
    }

    async fn entitlements(&self, _resource: &Resource, _token: &str) -> Result<SyncPage<Entitlement>> {
        Ok((Vec::new(), String::new()))
    }

    async fn grants(&self, _resource: &Resource, _token: &str) -> Result<SyncPage<Grant>> {
        Ok((Vec::new(), String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::Traits;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_list_investor_firms() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1alpha1/investors/firms")
                .query_param("pageSize", "100");
            then.status(200).json_body(serde_json::json!({
                "firms": [{"id": "f1", "name": "Seed Partners"}]
            }));
        });

        let client = CartaClient::new(&server.url("/v1alpha1/"), "t").unwrap();
        let (resources, token) = InvestorSyncer::new(client, 100)
            .list(None, "")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(token, "");
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, ResourceId::new("investor", "f1"));
        match &resources[0].traits {
            Traits::User {
                profile: UserProfile::Investor(profile),
                ..
            } => {
                assert_eq!(profile.login, "Seed Partners");
                assert_eq!(profile.investor_id, "f1");
            }
            other => panic!("unexpected traits: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_investors_have_no_entitlements_or_grants() {
        let client = CartaClient::new("http://127.0.0.1:9/", "t").unwrap();
        let syncer = InvestorSyncer::new(client, 100);
        let resource = investor_resource(
            &InvestorFirm {
                id: "f1".to_string(),
                name: "Seed Partners".to_string(),
            },
            None,
        );

        assert!(syncer.entitlements(&resource, "").await.unwrap().0.is_empty());
        assert!(syncer.grants(&resource, "").await.unwrap().0.is_empty());
    }
}
