//! Scripted in-memory platform for driver and streamer tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::StreamExt;
use tokio::sync::watch;

use nimbus::errors::CliError;
use nimbus::models::application::{Application, CreateApplication, EnvVar};
use nimbus::models::deployment::{DeployState, Deployment, PublishReceipt};
use nimbus::models::log::{LogEntry, LogSource};
use nimbus::platform::{ActivityScope, LogStream, PlatformApi};

/// One scripted response of the status endpoint: a reported state or a
/// simulated transient transport failure.
pub type StatusScript = Result<DeployState, ()>;

#[derive(Default)]
pub struct MockPlatform {
    pub statuses: Mutex<VecDeque<StatusScript>>,
    pub publishes: Mutex<VecDeque<Result<PublishReceipt, CliError>>>,
    pub log_batches: Mutex<VecDeque<Vec<LogEntry>>>,
    pub deployments: Mutex<Vec<Deployment>>,
    pub apps: Mutex<Vec<Application>>,
    pub cancels: Mutex<Vec<(String, String)>>,
    pub stops: Mutex<Vec<String>>,
    /// Flipped to this state once every log batch has been handed out,
    /// so attached-streamer tests terminate deterministically
    pub terminal_on_logs_exhausted: Mutex<Option<(watch::Sender<DeployState>, DeployState)>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = StatusScript>) -> Self {
        let mock = Self::new();
        *mock.statuses.lock().unwrap() = statuses.into_iter().collect();
        mock
    }

    pub fn push_log_batch(&self, tokens: &[u64]) {
        let batch = tokens.iter().map(|&t| entry(t)).collect();
        self.log_batches.lock().unwrap().push_back(batch);
    }

    fn transient() -> CliError {
        CliError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "simulated transport failure",
        ))
    }
}

/// A log entry with a deterministic timestamp derived from its token
pub fn entry(token: u64) -> LogEntry {
    LogEntry {
        token,
        timestamp: Utc.timestamp_opt(1_700_000_000 + token as i64, 0).unwrap(),
        source: LogSource::Runtime,
        message: format!("line {}", token),
    }
}

pub fn app(id: &str) -> Application {
    Application {
        id: id.to_string(),
        name: format!("{}-name", id),
        org_id: None,
        region: "par".to_string(),
        instance_type: "nano".to_string(),
    }
}

#[async_trait]
impl PlatformApi for MockPlatform {
    async fn publish_source(&self, _: &str, _: &str) -> Result<PublishReceipt, CliError> {
        self.publishes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::transient()))
    }

    async fn deployment_status(&self, _: &str, _: &str) -> Result<DeployState, CliError> {
        match self.statuses.lock().unwrap().pop_front() {
            Some(Ok(state)) => Ok(state),
            Some(Err(())) | None => Err(Self::transient()),
        }
    }

    async fn request_cancel(&self, app_id: &str, deployment_id: &str) -> Result<(), CliError> {
        self.cancels
            .lock()
            .unwrap()
            .push((app_id.to_string(), deployment_id.to_string()));
        Ok(())
    }

    async fn stream_logs(&self, _: &str, _: Option<u64>) -> Result<LogStream, CliError> {
        let batch = self.log_batches.lock().unwrap().pop_front();
        match batch {
            Some(entries) => Ok(futures::stream::iter(entries.into_iter().map(Ok)).boxed()),
            None => {
                if let Some((tx, state)) = self.terminal_on_logs_exhausted.lock().unwrap().take() {
                    let _ = tx.send(state);
                }
                Ok(futures::stream::iter(Vec::new()).boxed())
            }
        }
    }

    async fn list_deployments(
        &self,
        _: &str,
        _: ActivityScope,
    ) -> Result<Vec<Deployment>, CliError> {
        Ok(self.deployments.lock().unwrap().clone())
    }

    async fn create_application(&self, _: &CreateApplication) -> Result<Application, CliError> {
        unimplemented!("not scripted")
    }

    async fn stop_application(&self, app_id: &str) -> Result<(), CliError> {
        self.stops.lock().unwrap().push(app_id.to_string());
        Ok(())
    }

    async fn get_application(&self, app_id: &str) -> Result<Application, CliError> {
        self.apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == app_id)
            .cloned()
            .ok_or_else(|| CliError::Api {
                status: 404,
                body: format!("no such application: {}", app_id),
            })
    }

    async fn list_env(&self, _: &str) -> Result<Vec<EnvVar>, CliError> {
        unimplemented!("not scripted")
    }

    async fn set_env(&self, _: &str, _: &str, _: &str) -> Result<(), CliError> {
        unimplemented!("not scripted")
    }

    async fn remove_env(&self, _: &str, _: &str) -> Result<(), CliError> {
        unimplemented!("not scripted")
    }

    async fn list_domains(&self, _: &str) -> Result<Vec<String>, CliError> {
        unimplemented!("not scripted")
    }

    async fn add_domain(&self, _: &str, _: &str) -> Result<(), CliError> {
        unimplemented!("not scripted")
    }

    async fn remove_domain(&self, _: &str, _: &str) -> Result<(), CliError> {
        unimplemented!("not scripted")
    }
}
