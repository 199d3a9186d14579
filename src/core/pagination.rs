use crate::utils::error::{ConnectorError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::collections::BTreeMap;

/// Per-resource-type cursors carried between `list` calls.
///
/// Inside the crate the state is a plain map from resource type id to the
/// cursor of its next page. Callers outside only ever see the opaque string
/// produced by [`ContinuationState::encode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationState {
    cursors: BTreeMap<String, String>,
}

impl ContinuationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an opaque token; the empty token is the initial state.
    pub fn parse(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Ok(Self::new());
        }

        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| ConnectorError::InvalidPageToken {
                reason: format!("not valid base64: {}", e),
            })?;
        let cursors: BTreeMap<String, String> =
            serde_json::from_slice(&raw).map_err(|e| ConnectorError::InvalidPageToken {
                reason: format!("not a cursor map: {}", e),
            })?;

        Ok(Self { cursors })
    }

    pub fn cursor(&self, resource_type: &str) -> &str {
        self.cursors
            .get(resource_type)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Records the cursor for the next page of `resource_type` and returns the
    /// token to hand back to the caller. An empty `next` drops the entry.
    pub fn advance(&mut self, resource_type: &str, next: &str) -> Result<String> {
        if next.is_empty() {
            self.cursors.remove(resource_type);
        } else {
            self.cursors
                .insert(resource_type.to_string(), next.to_string());
        }
        self.encode()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn encode(&self) -> Result<String> {
        if self.cursors.is_empty() {
            return Ok(String::new());
        }
        let raw = serde_json::to_vec(&self.cursors)?;
        Ok(URL_SAFE_NO_PAD.encode(raw))
    }
}
