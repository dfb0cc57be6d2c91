use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Health probe request failed: {0}")]
    ProbeError(#[from] reqwest::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Port {port} is outside the {component} range {start}-{end}")]
    OutOfRange {
        port: u16,
        component: String,
        start: u16,
        end: u16,
    },

    #[error("Port {port} is already held by '{holder}'")]
    PortTaken { port: u16, holder: String },

    #[error("No free ports left in the {component} range")]
    RangeExhausted { component: String },

    #[error("Port {port} has no runtime allocation to release")]
    NotAllocated { port: u16 },

    #[error("Illegal deployment transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Cutover refused: idle slot is {state}, not healthy")]
    CutoverRefused { state: String },

    #[error("Deployment processing error: {message}")]
    DeployError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Allocation,
    Deployment,
    Network,
    System,
}

impl OrchestratorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::OutOfRange { .. }
            | Self::PortTaken { .. }
            | Self::RangeExhausted { .. }
            | Self::NotAllocated { .. } => ErrorCategory::Allocation,
            Self::InvalidTransition { .. }
            | Self::CutoverRefused { .. }
            | Self::DeployError { .. } => ErrorCategory::Deployment,
            Self::ProbeError(_) => ErrorCategory::Network,
            Self::ZipError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotAllocated { .. } => ErrorSeverity::Low,
            Self::ProbeError(_) | Self::CutoverRefused { .. } => ErrorSeverity::Medium,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::OutOfRange { .. }
            | Self::PortTaken { .. }
            | Self::RangeExhausted { .. }
            | Self::InvalidTransition { .. }
            | Self::DeployError { .. } => ErrorSeverity::High,
            Self::ZipError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Check the '{}' entry in your configuration file", field)
            }
            Self::OutOfRange { component, start, end, .. } => {
                format!("Pick a port between {} and {} for {}", start, end, component)
            }
            Self::PortTaken { holder, .. } => {
                format!("Release the port from '{}' first, or allocate a new one", holder)
            }
            Self::RangeExhausted { component } => {
                format!("Free unused {} ports or widen the range in the inventory file", component)
            }
            Self::NotAllocated { .. } => {
                "Only runtime allocations can be released; inventory ports are fixed".to_string()
            }
            Self::InvalidTransition { .. } => {
                "Deployments must pass through provisioning before going live".to_string()
            }
            Self::CutoverRefused { .. } => {
                "Wait for the staged slot to report healthy, or roll it back".to_string()
            }
            Self::DeployError { .. } => "Inspect the deployment plan and retry".to_string(),
            Self::ProbeError(_) => {
                "Verify the service is listening and its /health endpoint responds".to_string()
            }
            Self::IoError(_) => "Check the output path exists and is writable".to_string(),
            _ => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Allocation => format!("Port allocation problem: {}", self),
            ErrorCategory::Deployment => format!("Deployment problem: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
