use thiserror::Error;

#[derive(Error, Debug)]
pub enum FingyError {
    #[error("Browser not found. Please install Chrome, Chromium, Brave, or Edge.")]
    BrowserNotFound,

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("CDP connection failed: {0}")]
    CdpConnectionFailed(String),

    #[error("Browser not running on the configured CDP port.")]
    BrowserNotRunning,

    #[error("JavaScript execution failed: {0}")]
    JavaScriptError(String),

    #[error("{probe} probe failed: {message}")]
    ProbeFailed {
        probe: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl FingyError {
    /// Wrap a host-side failure with the name of the probe that hit it.
    pub fn probe(probe: &'static str, message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            probe,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FingyError>;
