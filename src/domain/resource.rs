//! Typed rendition of the governance platform's resource graph.
//!
//! Every object here mirrors what the platform SDK builds for a connector:
//! resource types with traits, resources carrying a typed profile,
//! assignment entitlements and the grants that bind principals to them.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrait {
    User,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    pub id: &'static str,
    pub display_name: &'static str,
    pub traits: &'static [ResourceTrait],
}

pub static RESOURCE_TYPE_ISSUER: ResourceType = ResourceType {
    id: "issuer",
    display_name: "Issuer",
    traits: &[ResourceTrait::User],
};

pub static RESOURCE_TYPE_INVESTOR: ResourceType = ResourceType {
    id: "investor",
    display_name: "Investor",
    traits: &[ResourceTrait::User],
};

pub static RESOURCE_TYPE_PORTFOLIO: ResourceType = ResourceType {
    id: "portfolio",
    display_name: "Portfolio",
    traits: &[ResourceTrait::Group],
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource_type: String,
    pub resource: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Unspecified,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub issuer_legal_name: String,
    pub issuer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorProfile {
    pub login: String,
    pub investor_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioProfile {
    pub portfolio_legal_name: String,
    pub portfolio_id: String,
    pub portfolio_issuer_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserProfile {
    Issuer(IssuerProfile),
    Investor(InvestorProfile),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trait", rename_all = "snake_case")]
pub enum Traits {
    User {
        profile: UserProfile,
        status: UserStatus,
    },
    Group {
        profile: PortfolioProfile,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_resource_id: Option<ResourceId>,
    pub traits: Traits,
}

impl Resource {
    pub fn new_user(
        display_name: impl Into<String>,
        resource_type: &ResourceType,
        id: impl Into<String>,
        profile: UserProfile,
        parent_resource_id: Option<ResourceId>,
    ) -> Self {
        Self {
            id: ResourceId::new(resource_type.id, id),
            display_name: display_name.into(),
            parent_resource_id,
            traits: Traits::User {
                profile,
                status: UserStatus::Unspecified,
            },
        }
    }

    pub fn new_group(
        display_name: impl Into<String>,
        resource_type: &ResourceType,
        id: impl Into<String>,
        profile: PortfolioProfile,
    ) -> Self {
        Self {
            id: ResourceId::new(resource_type.id, id),
            display_name: display_name.into(),
            parent_resource_id: None,
            traits: Traits::Group { profile },
        }
    }

    pub fn group_profile(&self) -> Option<&PortfolioProfile> {
        match &self.traits {
            Traits::Group { profile } => Some(profile),
            Traits::User { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    Assignment,
    Permission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    pub resource: ResourceId,
    pub slug: String,
    pub display_name: String,
    pub description: String,
    pub grantable_to: Vec<String>,
    pub purpose: EntitlementPurpose,
}

impl Entitlement {
    /// Builds an assignment entitlement; id is `{type}:{resource}:{slug}`.
    pub fn assignment(
        resource: &Resource,
        slug: &str,
        display_name: impl Into<String>,
        description: impl Into<String>,
        grantable_to: &[&ResourceType],
    ) -> Self {
        Self {
            id: entitlement_id(&resource.id, slug),
            resource: resource.id.clone(),
            slug: slug.to_string(),
            display_name: display_name.into(),
            description: description.into(),
            grantable_to: grantable_to.iter().map(|rt| rt.id.to_string()).collect(),
            purpose: EntitlementPurpose::Assignment,
        }
    }
}

pub fn entitlement_id(resource: &ResourceId, slug: &str) -> String {
    format!("{}:{}:{}", resource.resource_type, resource.resource, slug)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: String,
    pub entitlement_id: String,
    pub principal: ResourceId,
}

impl Grant {
    pub fn new(resource: &Resource, slug: &str, principal: ResourceId) -> Self {
        let entitlement_id = entitlement_id(&resource.id, slug);
        Self {
            id: format!(
                "{}:{}:{}",
                entitlement_id, principal.resource_type, principal.resource
            ),
            entitlement_id,
            principal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: Option<String>,
}
