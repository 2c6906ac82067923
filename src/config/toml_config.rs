use crate::domain::model::Device;
use crate::utils::error::{CollectorError, Result};
use crate::utils::pacing::RequestInterval;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL_TEMPLATE: &str = "https://search.rakuten.co.jp/search/mall/{keyword}/";

pub const PC_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
pub const SP_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_devices")]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub interval: IntervalConfig,
    #[serde(default)]
    pub user_agents: UserAgentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub supabase: Option<SupabaseConfig>,
    pub local: Option<LocalConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            devices: default_devices(),
            search: SearchConfig::default(),
            interval: IntervalConfig::default(),
            user_agents: UserAgentConfig::default(),
            storage: StorageConfig::default(),
            supabase: None,
            local: None,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub url_template: String,
    pub marketplace_domain: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub accept_language: String,
    pub accept: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_SEARCH_URL_TEMPLATE.to_string(),
            marketplace_domain: crate::core::identifier::DEFAULT_MARKETPLACE_DOMAIN.to_string(),
            timeout_seconds: 15,
            retry_attempts: 0,
            retry_delay_seconds: 2,
            accept_language: "ja,en-US;q=0.9,en;q=0.8".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub pc: String,
    pub sp: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pc: PC_USER_AGENT.to_string(),
            sp: SP_USER_AGENT.to_string(),
        }
    }
}

impl UserAgentConfig {
    pub fn for_device(&self, device: Device) -> &str {
        match device {
            Device::Pc => &self.pc,
            Device::Sp => &self.sp,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Supabase,
    Local,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub r#type: StorageKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub secret_key: String,
    #[serde(default = "default_schema")]
    pub schema: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    pub targets_file: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: Option<String>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: Some("logs".to_string()),
            json: false,
        }
    }
}

fn default_devices() -> Vec<Device> {
    Device::ALL.to_vec()
}

fn default_schema() -> String {
    "rank_tracker".to_string()
}

fn default_output_dir() -> String {
    "./output".to_string()
}

impl CollectorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CollectorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CollectorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_SECRET_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CollectorError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 沒有 [supabase] 區段時改讀 SUPABASE_URL / SUPABASE_SECRET_KEY
    pub fn supabase_settings(&self) -> Result<SupabaseConfig> {
        if let Some(supabase) = &self.supabase {
            return Ok(supabase.clone());
        }

        let url = std::env::var("SUPABASE_URL").ok();
        let secret_key = std::env::var("SUPABASE_SECRET_KEY").ok();
        Ok(SupabaseConfig {
            url: validation::validate_required_field("SUPABASE_URL", &url)?.clone(),
            secret_key: validation::validate_required_field("SUPABASE_SECRET_KEY", &secret_key)?
                .clone(),
            schema: default_schema(),
        })
    }

    pub fn local_settings(&self) -> Result<&LocalConfig> {
        validation::validate_required_field("local", &self.local)
    }

    pub fn request_interval(&self) -> RequestInterval {
        RequestInterval::new(self.interval.min_secs, self.interval.max_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_seconds)
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.logging.log_dir.as_deref().map(Path::new)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let search = &self.search;
        validation::validate_url("search.url_template", &search.url_template)?;
        if !search.url_template.contains("{keyword}") {
            return Err(CollectorError::InvalidConfigValueError {
                field: "search.url_template".to_string(),
                value: search.url_template.clone(),
                reason: "Template must contain the {keyword} placeholder".to_string(),
            });
        }
        validation::validate_non_empty_string("search.marketplace_domain", &search.marketplace_domain)?;
        validation::validate_positive_number("search.timeout_seconds", search.timeout_seconds, 1)?;
        validation::validate_range("search.retry_attempts", search.retry_attempts, 0, 10)?;

        validation::validate_range("interval.min_secs", self.interval.min_secs, 0.0, 600.0)?;
        validation::validate_range("interval.max_secs", self.interval.max_secs, 0.0, 600.0)?;
        if self.interval.min_secs > self.interval.max_secs {
            return Err(CollectorError::ConfigValidationError {
                field: "interval".to_string(),
                message: "min_secs must not exceed max_secs".to_string(),
            });
        }

        if self.devices.is_empty() {
            return Err(CollectorError::ConfigValidationError {
                field: "devices".to_string(),
                message: "At least one device is required".to_string(),
            });
        }
        for device in &self.devices {
            validation::validate_non_empty_string(
                &format!("user_agents.{}", device),
                self.user_agents.for_device(*device),
            )?;
        }

        match self.storage.r#type {
            StorageKind::Supabase => {
                let supabase = self.supabase_settings()?;
                validation::validate_url("supabase.url", &supabase.url)?;
                if supabase.secret_key.trim().is_empty() || supabase.secret_key.starts_with("${") {
                    return Err(CollectorError::MissingConfigError {
                        field: "supabase.secret_key".to_string(),
                    });
                }
                validation::validate_non_empty_string("supabase.schema", &supabase.schema)?;
            }
            StorageKind::Local => {
                let local = self.local_settings()?;
                validation::validate_path("local.targets_file", &local.targets_file)?;
                validation::validate_path("local.output_dir", &local.output_dir)?;
            }
        }

        Ok(())
    }
}

impl Validate for CollectorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
