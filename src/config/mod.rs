pub mod cli;

use crate::core::ConfigProvider;
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://kobocat.unhcr.org/api/v1/submissions";

pub const SUPPORTED_SOURCE_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

/// 設定檔原始內容，所有欄位皆可缺省，缺漏由 `into_config` 回報
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    parent_data_path: Option<String>,
    api_token: Option<String>,
    project_uuid: Option<String>,
    endpoint: Option<String>,
    sheet_name: Option<String>,
}

impl RawConfig {
    /// 解析後才替換 `${VAR}`，環境變數的值不會被當成 JSON/TOML 語法
    fn into_config(self) -> Result<SubmissionConfig> {
        let re = placeholder_regex()?;
        let resolve = |field: &str, value: Option<String>| -> Result<Option<String>> {
            value
                .map(|v| substitute_env_vars(&re, field, &v))
                .transpose()
        };

        let parent_data_path = resolve("parent_data_path", self.parent_data_path)?;
        let api_token = resolve("api_token", self.api_token)?;
        let project_uuid = resolve("project_uuid", self.project_uuid)?;
        let endpoint = resolve("endpoint", self.endpoint)?;
        let sheet_name = resolve("sheet_name", self.sheet_name)?;

        Ok(SubmissionConfig {
            parent_data_path: validation::validate_required_field("parent_data_path", &parent_data_path)?
                .clone(),
            api_token: validation::validate_required_field("api_token", &api_token)?.clone(),
            project_uuid: validation::validate_required_field("project_uuid", &project_uuid)?.clone(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            sheet_name,
        })
    }
}

fn placeholder_regex() -> Result<Regex> {
    Regex::new(r"\$\{([^}]+)\}").map_err(|e| BridgeError::ConfigParseError {
        field: "env_substitution".to_string(),
        message: e.to_string(),
    })
}

/// 替換環境變數 (例如 ${KOBO_API_TOKEN})；未設定的變數視為缺少該設定
fn substitute_env_vars(re: &Regex, field: &str, value: &str) -> Result<String> {
    for caps in re.captures_iter(value) {
        let var_name = &caps[1];
        if std::env::var(var_name).is_err() {
            return Err(BridgeError::MissingConfigError {
                field: format!("{} (environment variable {} is not set)", field, var_name),
            });
        }
    }

    let result = re.replace_all(value, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    });

    Ok(result.into_owned())
}

#[derive(Clone)]
pub struct SubmissionConfig {
    pub parent_data_path: String,
    pub api_token: String,
    pub project_uuid: String,
    pub endpoint: String,
    pub sheet_name: Option<String>,
}

// token 不進 log
impl std::fmt::Debug for SubmissionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionConfig")
            .field("parent_data_path", &self.parent_data_path)
            .field("api_token", &"<redacted>")
            .field("project_uuid", &self.project_uuid)
            .field("endpoint", &self.endpoint)
            .field("sheet_name", &self.sheet_name)
            .finish()
    }
}

impl SubmissionConfig {
    pub fn new(
        parent_data_path: impl Into<String>,
        api_token: impl Into<String>,
        project_uuid: impl Into<String>,
    ) -> Self {
        Self {
            parent_data_path: parent_data_path.into(),
            api_token: api_token.into(),
            project_uuid: project_uuid.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sheet_name: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// 從檔案載入配置，`.toml` 走 TOML，其餘視為 JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(BridgeError::IoError)?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(content).map_err(|e| BridgeError::ConfigParseError {
                field: "json_parsing".to_string(),
                message: format!("JSON parsing error: {}", e),
            })?;
        raw.into_config()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| BridgeError::ConfigParseError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        raw.into_config()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("parent_data_path", &self.parent_data_path)?;
        validation::validate_file_extension(
            "parent_data_path",
            &self.parent_data_path,
            SUPPORTED_SOURCE_EXTENSIONS,
        )?;

        validation::validate_non_empty_string("api_token", &self.api_token)?;
        validation::validate_header_safe("api_token", &self.api_token)?;
        validation::validate_no_placeholder("api_token", &self.api_token)?;

        validation::validate_non_empty_string("project_uuid", &self.project_uuid)?;
        validation::validate_no_placeholder("project_uuid", &self.project_uuid)?;

        validation::validate_url("endpoint", &self.endpoint)?;

        Ok(())
    }
}

impl ConfigProvider for SubmissionConfig {
    fn api_endpoint(&self) -> &str {
        &self.endpoint
    }

    fn api_token(&self) -> &str {
        &self.api_token
    }

    fn project_uuid(&self) -> &str {
        &self.project_uuid
    }

    fn parent_data_path(&self) -> &str {
        &self.parent_data_path
    }

    fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }
}

impl Validate for SubmissionConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
