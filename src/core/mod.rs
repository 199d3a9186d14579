pub mod connector;
pub mod engine;
pub mod investor;
pub mod issuer;
pub mod pagination;
pub mod pipeline;
pub mod portfolio;

pub use crate::domain::model::{InvestorFirm, Issuer, PageResult, PaginationParams, Portfolio};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ResourceSyncer, Storage};
pub use crate::utils::error::Result;

use crate::utils::error::ConnectorError;

pub(crate) fn listing_failed(resource_type: &str, source: ConnectorError) -> ConnectorError {
    ConnectorError::List {
        resource_type: resource_type.to_string(),
        source: Box::new(source),
    }
}
