//! Deployment driver state machine
//!
//! Owns the lifecycle of one deployment: `Initiated` at construction,
//! `Published` once the source push returns a revision handle, then
//! every transition comes from a remote status observation. The driver
//! never infers a transition locally.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::CliError;
use crate::models::deployment::{DeployState, PublishReceipt};
use crate::platform::PlatformApi;
use crate::utils::{calc_exp_backoff, BackoffOptions};

/// Driver tuning knobs
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Status polling interval
    pub poll_interval: Duration,

    /// Consecutive transient failures tolerated before giving up
    pub retry_ceiling: u32,

    /// Backoff between retries of a failed poll
    pub backoff: BackoffOptions,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            retry_ceiling: 5,
            backoff: BackoffOptions::default(),
        }
    }
}

/// Drives a single deployment to a terminal state
///
/// The current state is published through a watch channel: single
/// writer (the driver), any number of readers (the log display loop,
/// the final reporter). Once a terminal state is reached the driver
/// stops polling and refuses further transitions.
pub struct DeploymentDriver<P: PlatformApi + ?Sized> {
    platform: Arc<P>,
    app_id: String,
    deployment_id: Option<String>,
    revision: Option<String>,
    options: DriverOptions,
    state_tx: watch::Sender<DeployState>,
}

impl<P: PlatformApi + ?Sized> DeploymentDriver<P> {
    /// Create a driver in `Initiated`, before the source push completes
    pub fn new(platform: Arc<P>, app_id: &str, options: DriverOptions) -> Self {
        let (state_tx, _) = watch::channel(DeployState::Initiated);
        Self {
            platform,
            app_id: app_id.to_string(),
            deployment_id: None,
            revision: None,
            options,
            state_tx,
        }
    }

    /// Current state
    pub fn state(&self) -> DeployState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<DeployState> {
        self.state_tx.subscribe()
    }

    /// Deployment ID, once published
    pub fn deployment_id(&self) -> Option<&str> {
        self.deployment_id.as_deref()
    }

    /// Revision handle, once published
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Record a successful source publish: `Initiated` → `Published`
    pub fn mark_published(&mut self, receipt: PublishReceipt) -> Result<(), CliError> {
        if self.state() != DeployState::Initiated {
            return Err(CliError::Internal(format!(
                "mark_published called in state '{}'",
                self.state()
            )));
        }
        self.deployment_id = Some(receipt.deployment_id);
        self.revision = Some(receipt.revision);
        self.state_tx.send_replace(DeployState::Published);
        Ok(())
    }

    /// Apply one remote observation; returns whether the state changed.
    ///
    /// Observations are monotonic in the state order: a report of a
    /// lesser or equal rank is a stale or duplicate read and is
    /// discarded. Nothing is applied after a terminal state.
    pub fn observe(&self, observed: DeployState) -> bool {
        let current = self.state();
        if current.is_terminal() {
            return false;
        }
        if observed.rank() <= current.rank() {
            if observed != current {
                debug!(
                    "Discarding stale observation '{}' (current: '{}')",
                    observed, current
                );
            }
            return false;
        }

        info!("Deployment state: {} -> {}", current, observed);
        self.state_tx.send_replace(observed);
        true
    }

    /// Ask the platform to cancel this deployment.
    ///
    /// Valid only in `Queued`, `Building` or `Deploying`; before the
    /// platform has accepted the revision there is nothing to cancel,
    /// and after a terminal state there is nothing left to do.
    /// Cancellation is cooperative: polling continues until a terminal
    /// state is observed regardless of this call's outcome.
    pub async fn request_cancel(&self) -> Result<(), CliError> {
        let current = self.state();
        if !current.is_cancellable() {
            return Err(CliError::InvalidCancelState(current));
        }

        let deployment_id = self
            .deployment_id
            .as_deref()
            .ok_or_else(|| CliError::Internal("cancellable driver without deployment id".into()))?;

        self.platform
            .request_cancel(&self.app_id, deployment_id)
            .await
            .map_err(|e| CliError::CancelRequestFailed(e.to_string()))
    }

    /// Poll the remote status channel until a terminal state.
    ///
    /// Transient transport failures are retried with exponential
    /// backoff; `retry_ceiling` consecutive failures surface
    /// `DriverUnreachable` without touching the deployment state — the
    /// remote deployment may still be proceeding, and the user can
    /// re-attach via `activity` or `log`.
    ///
    /// The sleep function is injected so tests can run the loop
    /// without waiting on wall-clock time.
    pub async fn run<S, F>(&self, sleep_fn: S) -> Result<DeployState, CliError>
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let deployment_id = match self.deployment_id.clone() {
            Some(id) => id,
            None => {
                return Err(CliError::Internal(
                    "driver polled before the source publish completed".into(),
                ))
            }
        };

        let mut err_streak: u32 = 0;
        loop {
            let current = self.state();
            if current.is_terminal() {
                return Ok(current);
            }

            sleep_fn(self.options.poll_interval).await;

            match self
                .platform
                .deployment_status(&self.app_id, &deployment_id)
                .await
            {
                Ok(observed) => {
                    err_streak = 0;
                    self.observe(observed);
                }
                Err(e) if e.is_transient() => {
                    err_streak += 1;
                    if err_streak >= self.options.retry_ceiling {
                        warn!(
                            "Giving up polling deployment {} after {} failed attempts: {}",
                            deployment_id, err_streak, e
                        );
                        return Err(CliError::DriverUnreachable {
                            attempts: err_streak,
                        });
                    }
                    let delay = calc_exp_backoff(&self.options.backoff, err_streak);
                    debug!(
                        "Transient polling failure ({}/{}), retrying in {:?}: {}",
                        err_streak, self.options.retry_ceiling, delay, e
                    );
                    sleep_fn(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
