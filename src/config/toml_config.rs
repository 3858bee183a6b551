use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    pub anon_key: String,
    pub timeout_seconds: Option<u64>,
}

impl BackendConfig {
    /// HTTP timeout, 10 seconds unless configured.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds.unwrap_or(10))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    pub id: Option<String>,
    pub password: Option<String>,
    pub session_ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `compact` (default) or `json`
    pub format: Option<String>,
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ADMIN_PASSWORD})；找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = placeholder_regex()?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("backend.url", &self.backend.url)?;

        if configured(&self.backend.anon_key).is_none() {
            return Err(SiteError::MissingConfigError {
                field: "backend.anon_key".to_string(),
            });
        }

        if let Some(timeout) = self.backend.timeout_seconds {
            validation::validate_positive_number("backend.timeout_seconds", timeout, 1)?;
        }

        if let Some(ttl) = self.admin.session_ttl_minutes {
            validation::validate_positive_number(
                "admin.session_ttl_minutes",
                u64::try_from(ttl).unwrap_or(0),
                1,
            )?;
        }

        self.server
            .bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| SiteError::InvalidConfigValueError {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
                reason: e.to_string(),
            })?;

        match self.logging.format.as_deref() {
            None | Some("compact") | Some("json") => {}
            Some(other) => {
                return Err(SiteError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: other.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                })
            }
        }

        Ok(())
    }

    /// Admin id, or `None` when blank or left as an unresolved `${VAR}`.
    pub fn admin_id(&self) -> Option<String> {
        self.admin.id.as_deref().and_then(configured)
    }

    pub fn admin_password(&self) -> Option<String> {
        self.admin.password.as_deref().and_then(configured)
    }

    pub fn admin_configured(&self) -> bool {
        self.admin_id().is_some() && self.admin_password().is_some()
    }

    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        self.admin
            .session_ttl_minutes
            .filter(|m| *m > 0)
            .map(chrono::Duration::minutes)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.as_deref() == Some("json")
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn placeholder_regex() -> Result<regex::Regex> {
    regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigError {
        message: format!("placeholder pattern: {}", e),
    })
}

/// 空白或未替換的 ${VAR} 視為未設定；有值時原樣保留
fn configured(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let unresolved = placeholder_regex()
        .map(|re| re.is_match(trimmed))
        .unwrap_or(false);
    if trimmed.is_empty() || unresolved {
        None
    } else {
        Some(value.to_string())
    }
}
