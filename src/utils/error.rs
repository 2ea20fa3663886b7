use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppHostError {
    #[error("A service named '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("Unknown service '{name}'")]
    UnknownNode { name: String },

    #[error("Readiness dependencies form a cycle between: {}", .nodes.join(", "))]
    DependencyCycle { nodes: Vec<String> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Manifest parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl AppHostError {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppHostError::DuplicateName { .. } => "Give every service a unique name",
            AppHostError::UnknownNode { .. } => {
                "Register the service before referencing or waiting for it"
            }
            AppHostError::DependencyCycle { .. } => {
                "Remove one of the wait-for declarations so services can start in order"
            }
            AppHostError::IoError(_) => "Check that the file exists and is readable",
            AppHostError::SerializationError(_) => "Report this as a bug",
            AppHostError::TomlError(_) => "Check the manifest for TOML syntax errors",
            AppHostError::ConfigError { .. }
            | AppHostError::InvalidConfigValueError { .. }
            | AppHostError::MissingConfigError { .. } => {
                "Fix the configuration value and try again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppHostError>;
