//! Deployment models and the deployment state lattice

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deployment state
///
/// `Initiated` and `Published` are local-only states set by the driver
/// before the platform starts reporting; everything from `Queued`
/// onwards is observed remotely. `Running`, `Failed` and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployState {
    /// Driver constructed, source push not finished yet
    Initiated,

    /// Source accepted by the platform, revision handle assigned
    Published,

    /// Waiting for a build slot
    Queued,

    /// Build in progress
    Building,

    /// Rolling out the built revision
    Deploying,

    /// Successfully deployed and serving (terminal)
    Running,

    /// Platform reported a failure (terminal)
    Failed,

    /// Deployment was cancelled (terminal)
    Cancelled,
}

impl DeployState {
    /// Position in the progress order.
    ///
    /// The three terminal states share the top rank: they are
    /// alternate outcomes, not ordered among themselves.
    pub fn rank(self) -> u8 {
        match self {
            DeployState::Initiated => 0,
            DeployState::Published => 1,
            DeployState::Queued => 2,
            DeployState::Building => 3,
            DeployState::Deploying => 4,
            DeployState::Running | DeployState::Failed | DeployState::Cancelled => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeployState::Running | DeployState::Failed | DeployState::Cancelled
        )
    }

    /// States in which a cancellation request may be issued
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            DeployState::Queued | DeployState::Building | DeployState::Deploying
        )
    }
}

impl std::fmt::Display for DeployState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeployState::Initiated => "initiated",
            DeployState::Published => "published",
            DeployState::Queued => "queued",
            DeployState::Building => "building",
            DeployState::Deploying => "deploying",
            DeployState::Running => "running",
            DeployState::Failed => "failed",
            DeployState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A deployment as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    /// Platform-assigned deployment ID
    pub id: String,

    /// Owning application ID
    pub app_id: String,

    /// Revision handle of the published source snapshot
    pub revision: String,

    /// Current (or final) state
    pub state: DeployState,

    /// When the deployment started
    pub started_at: DateTime<Utc>,

    /// When the state was last observed by the platform
    pub last_seen_at: DateTime<Utc>,
}

/// Result of a successful source publish
#[derive(Debug, Clone, Deserialize)]
pub struct PublishReceipt {
    /// Deployment created for the published revision
    pub deployment_id: String,

    /// Revision handle the platform will build
    pub revision: String,
}
