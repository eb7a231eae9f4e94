use thiserror::Error;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Git host API error: {0}")]
    GitHost(#[from] GitHostError),
    #[error("Analysis error: {0}")]
    Analysis(String),
    #[error("I/O error while {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("Application error: {0}")]
    Generic(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Required configuration field '{0}' is missing or invalid")]
    FieldMissing(String),
}

/// Errors from the hosting-service (GitHub style) API client
#[derive(Debug, Error)]
pub enum GitHostError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or missing token")]
    Authentication,

    #[error("Pull request {pr_number} not found in {repository}")]
    PullRequestNotFound { repository: String, pr_number: u64 },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Unexpected response structure from API: {0}")]
    UnexpectedResponse(String),
}
