use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Required field is missing: {field}")]
    MissingRequiredField { field: String },

    #[error("Business category has not been selected")]
    MissingCategory,

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Persistence failed during {operation}: {message}")]
    PersistenceFailure { operation: String, message: String },

    #[error("Admin session is missing or expired")]
    Unauthorized,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Persistence,
    NotFound,
    Auth,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn missing_field(field: &str) -> Self {
        SiteError::MissingRequiredField {
            field: field.to_string(),
        }
    }

    pub fn persistence(operation: &str, message: impl Into<String>) -> Self {
        SiteError::PersistenceFailure {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        SiteError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::MissingRequiredField { .. }
            | SiteError::MissingCategory
            | SiteError::InvalidInput { .. } => ErrorCategory::Validation,
            SiteError::PersistenceFailure { .. } => ErrorCategory::Persistence,
            SiteError::NotFound { .. } => ErrorCategory::NotFound,
            SiteError::Unauthorized => ErrorCategory::Auth,
            SiteError::ConfigError { .. }
            | SiteError::MissingConfigError { .. }
            | SiteError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            SiteError::IoError(_) | SiteError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::Persistence | ErrorCategory::Auth => ErrorSeverity::Medium,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 使用者可以重新操作的錯誤 (修正輸入或重試)
    pub fn is_recoverable(&self) -> bool {
        self.severity() <= ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::MissingRequiredField { .. } => {
                "이름, 연락처, 이메일은 필수 입력 항목입니다.".to_string()
            }
            SiteError::MissingCategory => "업종을 먼저 선택해 주세요.".to_string(),
            SiteError::InvalidInput { field, reason, .. } => {
                format!("입력값을 확인해 주세요 ({}: {})", field, reason)
            }
            SiteError::NotFound { .. } => "프로젝트를 찾을 수 없습니다.".to_string(),
            SiteError::PersistenceFailure { .. } => {
                "요청 저장 중 오류가 발생했습니다. 잠시 후 다시 시도해 주세요.".to_string()
            }
            SiteError::Unauthorized => "관리자 로그인이 필요합니다.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Correct the highlighted input and submit again",
            ErrorCategory::Persistence => "Check backend availability and retry the same action",
            ErrorCategory::NotFound => "Return to the portfolio list and pick another project",
            ErrorCategory::Auth => "Log in again from the admin page",
            ErrorCategory::Config => "Check the configuration file and environment variables",
            ErrorCategory::System => "Check file permissions and disk state",
        }
    }
}

impl From<reqwest::Error> for SiteError {
    fn from(err: reqwest::Error) -> Self {
        let operation = err
            .url()
            .map(|u| u.path().to_string())
            .unwrap_or_else(|| "request".to_string());
        SiteError::PersistenceFailure {
            operation,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
