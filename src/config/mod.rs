pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::http::DEFAULT_BASE_URL;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

pub const MAX_PAGE_SIZE: u32 = 1000;

#[cfg(feature = "cli")]
#[derive(Clone, Parser)]
#[command(name = "carta-connector")]
#[command(about = "Sync Carta issuers, investor firms and portfolios into an identity resource graph")]
pub struct CliConfig {
    #[arg(long, env = "CARTA_ACCESS_TOKEN", hide_env_values = true, default_value = "")]
    pub access_token: String,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = "100", help = "Page size for listings, 0 lets the server decide")]
    pub page_size: u32,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(short, long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("output_path", &self.output_path)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("config", &self.config)
            .field("json_logs", &self.json_logs)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout_seconds
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_access_token("access_token", &self.access_token)?;
        validation::validate_range("page_size", self.page_size, 0, MAX_PAGE_SIZE)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validation::validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
