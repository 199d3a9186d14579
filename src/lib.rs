pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::CartaClient, storage::LocalStorage};
pub use config::toml_config::TomlConfig;
pub use core::{
    connector::CartaConnector, engine::SyncEngine, pagination::ContinuationState,
    pipeline::SyncPipeline,
};
pub use utils::error::{ConnectorError, Result};
