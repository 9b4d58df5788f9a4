use thiserror::Error;

/// Errors raised by the browser backend, the configuration layer and the snapshot store.
///
/// The extraction core itself never returns these: page failures inside a run are
/// downgraded to "not found" and the run always yields its best record set.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Page bridge returned an unexpected reply: {0}")]
    BridgeProtocol(String),

    #[error("Page bridge call '{call}' failed: {reason}")]
    BridgeCall { call: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not a Google Maps page: {0}")]
    NotAMapsPage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
