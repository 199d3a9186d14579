use crate::domain::resource::{Entitlement, Grant, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every resource listed during one pass, in syncer order.
#[derive(Debug, Clone, Default)]
pub struct SyncSnapshot {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone)]
pub struct SyncOutput {
    pub resources: Vec<Resource>,
    pub entitlements: Vec<Entitlement>,
    pub grants: Vec<Grant>,
    pub grants_csv: String,
    pub manifest: SyncManifest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncManifest {
    pub connector: String,
    pub resource_count: usize,
    pub entitlement_count: usize,
    pub grant_count: usize,
    pub synced_at: DateTime<Utc>,
}
