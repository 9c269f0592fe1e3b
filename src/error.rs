use thiserror::Error;

#[derive(Error, Debug)]
pub enum RdashError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed. Check that {0} holds a valid Render API key")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Wait a moment before refreshing")]
    RateLimited,

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service '{0}' not found in config")]
    ServiceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RdashError {
    fn from(e: serde_json::Error) -> Self {
        RdashError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for RdashError {
    fn from(e: toml::de::Error) -> Self {
        RdashError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for RdashError {
    fn from(e: reqwest::Error) -> Self {
        RdashError::Network(e.to_string())
    }
}
