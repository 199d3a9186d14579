use crate::adapters::http::DEFAULT_BASE_URL;
use crate::config::MAX_PAGE_SIZE;
use crate::core::ConfigProvider;
use crate::utils::error::{ConnectorError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub connector: ConnectorSection,
    pub output: OutputSection,
    pub logging: Option<LoggingSection>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectorSection {
    pub base_url: Option<String>,
    pub access_token: String,
    pub page_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for ConnectorSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorSection")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConnectorError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CARTA_ACCESS_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| ConnectorError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.json)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        self.connector.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn access_token(&self) -> &str {
        &self.connector.access_token
    }

    fn page_size(&self) -> u32 {
        self.connector.page_size.unwrap_or(100)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn request_timeout_secs(&self) -> u64 {
        self.connector.timeout_seconds.unwrap_or(30)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("connector.base_url", self.base_url())?;
        validate_access_token("connector.access_token", self.access_token())?;
        validate_range("connector.page_size", self.page_size(), 0, MAX_PAGE_SIZE)?;
        validate_range("connector.timeout_seconds", self.request_timeout_secs(), 1, 300)?;
        validate_path("output.path", self.output_path())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[connector]
access_token = "abc"

[output]
path = "./sync"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.page_size(), 100);
        assert_eq!(config.request_timeout_secs(), 30);
        assert!(!config.verbose());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CARTA_CONNECTOR_TEST_TOKEN", "from-env");

        let toml_content = r#"
[connector]
base_url = "https://api.example.com/v1alpha1/"
access_token = "${CARTA_CONNECTOR_TEST_TOKEN}"
page_size = 25

[output]
path = "./sync"

[logging]
verbose = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.access_token(), "from-env");
        assert_eq!(config.page_size(), 25);
        assert!(config.verbose());

        std::env::remove_var("CARTA_CONNECTOR_TEST_TOKEN");
    }

    #[test]
    fn test_unset_variable_fails_validation() {
        let toml_content = r#"
[connector]
access_token = "${CARTA_CONNECTOR_TEST_UNSET_VARIABLE}"

[output]
path = "./sync"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_size_out_of_range() {
        let toml_content = r#"
[connector]
access_token = "abc"
page_size = 5000

[output]
path = "./sync"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConnectorError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[connector]\naccess_token = \"abc\"\n\n[output]\npath = \"./out\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./out");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[connector").unwrap_err();
        assert!(matches!(err, ConnectorError::Config { .. }));
    }
}
