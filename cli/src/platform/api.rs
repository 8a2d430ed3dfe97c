//! Platform API trait

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::errors::CliError;
use crate::models::application::{Application, CreateApplication, EnvVar};
use crate::models::deployment::{DeployState, Deployment, PublishReceipt};
use crate::models::log::LogEntry;

/// A live feed of log entries, as received from the transport
pub type LogStream = Pin<Box<dyn Stream<Item = Result<LogEntry, CliError>> + Send>>;

/// Scope selector for deployment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityScope {
    /// Recent deployments only
    Recent,

    /// Full history
    All,
}

impl ActivityScope {
    pub fn as_query_str(self) -> &'static str {
        match self {
            ActivityScope::Recent => "recent",
            ActivityScope::All => "all",
        }
    }
}

/// Authenticated access to the remote platform
///
/// All calls are network operations and may fail transiently. The
/// underlying transport must tolerate concurrent use: a stalled log
/// stream never blocks status polling and vice versa.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Push the local source tree for the given application and branch;
    /// the platform assigns a deployment ID and revision handle.
    async fn publish_source(
        &self,
        app_id: &str,
        branch: &str,
    ) -> Result<PublishReceipt, CliError>;

    /// Fetch the current remote state of a deployment
    async fn deployment_status(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> Result<DeployState, CliError>;

    /// Ask the platform to cancel a deployment (advisory; the effect is
    /// observed through subsequent status polls)
    async fn request_cancel(&self, app_id: &str, deployment_id: &str) -> Result<(), CliError>;

    /// Open a log feed starting after the given sequence token
    async fn stream_logs(&self, app_id: &str, since: Option<u64>) -> Result<LogStream, CliError>;

    /// List deployments for an application, most recent first
    async fn list_deployments(
        &self,
        app_id: &str,
        scope: ActivityScope,
    ) -> Result<Vec<Deployment>, CliError>;

    /// Create an application
    async fn create_application(&self, req: &CreateApplication) -> Result<Application, CliError>;

    /// Stop a running application
    async fn stop_application(&self, app_id: &str) -> Result<(), CliError>;

    /// Fetch an application record by ID
    async fn get_application(&self, app_id: &str) -> Result<Application, CliError>;

    /// List environment variables
    async fn list_env(&self, app_id: &str) -> Result<Vec<EnvVar>, CliError>;

    /// Add or update an environment variable
    async fn set_env(&self, app_id: &str, name: &str, value: &str) -> Result<(), CliError>;

    /// Remove an environment variable
    async fn remove_env(&self, app_id: &str, name: &str) -> Result<(), CliError>;

    /// List domain names bound to an application
    async fn list_domains(&self, app_id: &str) -> Result<Vec<String>, CliError>;

    /// Bind a domain name
    async fn add_domain(&self, app_id: &str, fqdn: &str) -> Result<(), CliError>;

    /// Unbind a domain name
    async fn remove_domain(&self, app_id: &str, fqdn: &str) -> Result<(), CliError>;
}
