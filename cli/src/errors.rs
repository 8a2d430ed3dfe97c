//! Error types for the Nimbus CLI

use thiserror::Error;

use crate::models::deployment::DeployState;

/// Main error type for the Nimbus CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("no alias given and no single linked application to fall back on")]
    UnresolvedAlias,

    #[error("unknown alias: {0}")]
    UnknownAlias(String),

    #[error("publish rejected by the platform: {0}")]
    PublishRejected(String),

    #[error("a deployment is already in flight for this application: {0}")]
    PublishConflict(String),

    #[error("lost contact with the platform after {attempts} polling attempts")]
    DriverUnreachable { attempts: u32 },

    #[error("deployment failed on the platform")]
    DeploymentFailed,

    #[error("deployment was cancelled")]
    DeploymentCancelled,

    #[error("cannot cancel a deployment in state '{0}'")]
    InvalidCancelState(DeployState),

    #[error("cancellation request failed: {0}")]
    CancelRequestFailed(String),

    #[error("no active deployment to cancel")]
    NoActiveDeployment,

    #[error("activity report unavailable: {0}")]
    ReportUnavailable(String),

    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Whether the error is worth retrying with backoff.
    ///
    /// Covers transient transport failures only; platform-reported
    /// rejections (4xx), malformed payloads and terminal deployment
    /// outcomes are not transient.
    pub fn is_transient(&self) -> bool {
        match self {
            CliError::Http(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            CliError::Io(_) => true,
            CliError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Process exit code for this error.
    ///
    /// 1 = remote failure, 2 = user error, 3 = transport failure,
    /// 4 = cancelled. Success (exit 0) never reaches this function.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DeploymentFailed
            | CliError::PublishRejected(_)
            | CliError::PublishConflict(_)
            | CliError::CancelRequestFailed(_)
            | CliError::Json(_)
            | CliError::Internal(_) => 1,

            CliError::UnresolvedAlias
            | CliError::UnknownAlias(_)
            | CliError::InvalidCancelState(_)
            | CliError::NoActiveDeployment
            | CliError::Registry(_)
            | CliError::Config(_) => 2,

            CliError::DriverUnreachable { .. }
            | CliError::ReportUnavailable(_)
            | CliError::Http(_)
            | CliError::Io(_) => 3,

            CliError::Api { status, .. } => {
                if *status >= 500 {
                    3
                } else {
                    1
                }
            }

            CliError::DeploymentCancelled => 4,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Internal(err.to_string())
    }
}
