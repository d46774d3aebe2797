use crate::core::tracking::{TrackingLink, DEFAULT_TRACKING_TEMPLATE, TRACKING_PLACEHOLDER};
use crate::core::WindowFeatures;
use crate::utils::error::{Result, ShipmentError};
use crate::utils::format::CurrencyFormat;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_placeholder, validate_range, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_METHOD_PREFIX: &str = "erpnext_shipstation.erpnext_shipstation.shipping";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub methods: MethodsConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub label: LabelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodsConfig {
    pub prefix: String,
}

impl Default for MethodsConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_METHOD_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub url_template: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        let window = WindowFeatures::default();
        Self {
            url_template: DEFAULT_TRACKING_TEMPLATE.to_string(),
            window_width: window.width,
            window_height: window.height,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency: String,
    pub precision: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let format = CurrencyFormat::default();
        Self {
            currency: format.currency,
            precision: format.precision,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub output_path: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            output_path: "./labels".to_string(),
        }
    }
}

impl DeskConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ShipmentError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ShipmentError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ERP_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ShipmentError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("server.base_url", &self.server.base_url)?;

        match (&self.server.api_key, &self.server.api_secret) {
            (Some(key), Some(secret)) => {
                validate_non_empty_string("server.api_key", key)?;
                validate_non_empty_string("server.api_secret", secret)?;
                for (field, value) in [("server.api_key", key), ("server.api_secret", secret)] {
                    if value.contains("${") {
                        return Err(ShipmentError::MissingConfigError {
                            field: format!("{} (unset variable in {})", field, value),
                        });
                    }
                }
            }
            (None, None) => {}
            (Some(_), None) => {
                return Err(ShipmentError::MissingConfigError {
                    field: "server.api_secret".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ShipmentError::MissingConfigError {
                    field: "server.api_key".to_string(),
                })
            }
        }

        if let Some(timeout) = self.server.timeout_seconds {
            validate_range("server.timeout_seconds", timeout, 1, 600)?;
        }

        validate_non_empty_string("methods.prefix", &self.methods.prefix)?;

        validate_placeholder(
            "tracking.url_template",
            &self.tracking.url_template,
            TRACKING_PLACEHOLDER,
        )?;
        validate_url(
            "tracking.url_template",
            &self.tracking.url_template.replace(TRACKING_PLACEHOLDER, "0"),
        )?;
        validate_range("tracking.window_width", self.tracking.window_width, 100, 4000)?;
        validate_range("tracking.window_height", self.tracking.window_height, 100, 4000)?;

        validate_non_empty_string("display.currency", &self.display.currency)?;
        validate_range("display.precision", self.display.precision, 0, 8)?;

        validate_path("label.output_path", &self.label.output_path)?;

        Ok(())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.server.timeout_seconds.unwrap_or(30)
    }

    pub fn tracking_link(&self) -> TrackingLink {
        TrackingLink::new(
            self.tracking.url_template.clone(),
            WindowFeatures {
                target: "_blank".to_string(),
                width: self.tracking.window_width,
                height: self.tracking.window_height,
            },
        )
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.display.currency.clone(), self.display.precision)
    }
}

impl Validate for DeskConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = DeskConfig::from_toml_str(
            r#"
[server]
base_url = "https://erp.example.com"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.methods.prefix, DEFAULT_METHOD_PREFIX);
        assert_eq!(config.timeout_seconds(), 30);
        assert_eq!(config.tracking.url_template, DEFAULT_TRACKING_TEMPLATE);
        assert_eq!(config.currency_format(), CurrencyFormat::default());
        assert_eq!(config.tracking_link(), TrackingLink::default());
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config = DeskConfig::from_toml_str(
            r#"
[server]
base_url = "https://erp.example.com"

[tracking]
url_template = "https://track.example.com/?n={tracking_number}"

[display]
currency = "EUR"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.tracking.window_width, 600);
        assert_eq!(config.tracking.window_height, 400);
        assert_eq!(config.display.currency, "EUR");
        assert_eq!(config.display.precision, 2);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHIPMENT_DESK_TEST_SECRET", "s3cret");

        let config = DeskConfig::from_toml_str(
            r#"
[server]
base_url = "https://erp.example.com"
api_key = "key"
api_secret = "${SHIPMENT_DESK_TEST_SECRET}"
"#,
        )
        .unwrap();

        assert_eq!(config.server.api_secret.as_deref(), Some("s3cret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unset_variable_is_reported() {
        let config = DeskConfig::from_toml_str(
            r#"
[server]
base_url = "https://erp.example.com"
api_key = "key"
api_secret = "${SHIPMENT_DESK_TEST_NEVER_SET}"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ShipmentError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_key_without_secret_is_rejected() {
        let config = DeskConfig::from_toml_str(
            r#"
[server]
base_url = "https://erp.example.com"
api_key = "key"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        let config = DeskConfig::from_toml_str(
            r#"
[server]
base_url = "https://erp.example.com"

[tracking]
url_template = "https://track.example.com/"
window_width = 600
window_height = 400
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
base_url = "http://localhost:8000"
timeout_seconds = 5

[display]
currency = "EUR"
precision = 2

[label]
output_path = "/tmp/labels"
"#
        )
        .unwrap();

        let config = DeskConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_seconds(), 5);
        assert_eq!(config.currency_format().currency, "EUR");
        assert_eq!(config.label.output_path, "/tmp/labels");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            DeskConfig::from_toml_str("[server\nbase_url ="),
            Err(ShipmentError::ConfigValidationError { .. })
        ));
    }
}
