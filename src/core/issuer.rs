use crate::adapters::http::CartaClient;
use crate::core::listing_failed;
use crate::core::pagination::ContinuationState;
use crate::domain::model::{Issuer, PaginationParams};
use crate::domain::ports::{ResourceSyncer, SyncPage};
use crate::domain::resource::{
    Entitlement, Grant, IssuerProfile, Resource, ResourceId, ResourceType, UserProfile,
    RESOURCE_TYPE_ISSUER,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Builds the user resource for an issuer (a company to invest in).
pub fn issuer_resource(issuer: &Issuer, parent: Option<&ResourceId>) -> Resource {
    let profile = UserProfile::Issuer(IssuerProfile {
        issuer_legal_name: issuer.name.clone(),
        issuer_id: issuer.id.clone(),
    });

    Resource::new_user(
        issuer.name.clone(),
        &RESOURCE_TYPE_ISSUER,
        issuer.id.clone(),
        profile,
        parent.cloned(),
    )
}

#[derive(Debug, Clone)]
pub struct IssuerSyncer {
    client: CartaClient,
    page_size: u32,
}

impl IssuerSyncer {
    pub fn new(client: CartaClient, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl ResourceSyncer for IssuerSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &RESOURCE_TYPE_ISSUER
    }

    async fn list(&self, parent: Option<&ResourceId>, token: &str) -> Result<SyncPage<Resource>> {
        let mut state = ContinuationState::parse(token)?;
        let params = PaginationParams::new(self.page_size, state.cursor(RESOURCE_TYPE_ISSUER.id));

        let page = self
            .client
            .get_issuers(&params)
            .await
            .map_err(|e| listing_failed("issuers", e))?;

        let next_token = state.advance(RESOURCE_TYPE_ISSUER.id, &page.next)?;
        let resources = page
            .items
            .iter()
            .map(|issuer| issuer_resource(issuer, parent))
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
    use crate::domain::resource::{Traits, UserStatus};
    use httpmock::prelude::*;

    #[test]
    fn test_issuer_resource_profile() {
        let issuer = Issuer {
            id: "i1".to_string(),
            name: "Acme Inc.".to_string(),
            website: "https://acme.test".to_string(),
        };
        let parent = ResourceId::new("tenant", "t1");

        let resource = issuer_resource(&issuer, Some(&parent));

        assert_eq!(resource.id, ResourceId::new("issuer", "i1"));
        assert_eq!(resource.display_name, "Acme Inc.");
        assert_eq!(resource.parent_resource_id, Some(parent));
        assert_eq!(
            resource.traits,
            Traits::User {
                profile: UserProfile::Issuer(IssuerProfile {
                    issuer_legal_name: "Acme Inc.".to_string(),
                    issuer_id: "i1".to_string(),
                }),
                status: UserStatus::Unspecified,
            }
        );
    }

    #[tokio::test]
    async fn test_list_walks_pages_through_opaque_token() {
        let server = MockServer::start();
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/issuers")
                .query_param("pageToken", "tok2");
            then.status(200).json_body(serde_json::json!({
                "issuers": [{"id": "i3", "legalName": "Three"}],
                "nextPageToken": "tok2"
            }));
        });
        let first = server.mock(|when, then| {
            when.method(GET).path("/issuers").query_param("pageSize", "2");
            then.status(200).json_body(serde_json::json!({
                "issuers": [{"id": "i1", "legalName": "One"}, {"id": "i2", "legalName": "Two"}],
                "nextPageToken": "tok2"
            }));
        });

        let client = CartaClient::new(&server.url("/"), "t").unwrap();
        let syncer = IssuerSyncer::new(client, 2);

        let (page1, token) = syncer.list(None, "").await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(
            ContinuationState::parse(&token).unwrap().cursor("issuer"),
            "tok2"
        );

        let (page2, token) = syncer.list(None, &token).await.unwrap();
        assert_eq!(page2[0].display_name, "Three");
        assert_eq!(token, "");

        first.assert_hits(1);
        second.assert_hits(1);
    }

    #[tokio::test]
    async fn test_list_failure_is_wrapped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/issuers");
            then.status(401);
        });

        let client = CartaClient::new(&server.url("/"), "bad").unwrap();
        let err = IssuerSyncer::new(client, 100).list(None, "").await.unwrap_err();

        assert!(err.to_string().contains("failed to list issuers"));
        assert_eq!(err.status_code(), Some(401));
    }
}
