//! HTTP implementation of the platform API

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::{header, Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::CliError;
use crate::models::application::{Application, CreateApplication, EnvVar};
use crate::models::deployment::{DeployState, Deployment, PublishReceipt};
use crate::models::log::LogEntry;
use crate::platform::api::{ActivityScope, LogStream, PlatformApi};

/// HTTP client for the platform API
pub struct HttpPlatform {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl HttpPlatform {
    /// Create a new platform client
    pub fn new(base_url: &str, token: SecretString) -> Result<Self, CliError> {
        url::Url::parse(base_url)
            .map_err(|e| CliError::Config(format!("invalid API base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    async fn check_status(response: Response) -> Result<Response, CliError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        error!("HTTP request failed: {} - {}", status, body);
        Err(CliError::Api { status, body })
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body = response.json().await?;
        Ok(body)
    }

    /// Make a POST request and parse the response body
    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, self.bearer())
            .json(body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body = response.json().await?;
        Ok(body)
    }

    /// Make a POST request, ignoring any response body
    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), CliError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, self.bearer())
            .json(body)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Make a PUT request, ignoring any response body
    async fn put_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), CliError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, self.bearer())
            .json(body)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Make a DELETE request
    async fn delete(&self, path: &str) -> Result<(), CliError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    state: DeployState,
}

#[derive(Debug, Deserialize)]
struct DeploymentListResponse {
    deployments: Vec<Deployment>,
}

/// Line-reassembly state for the NDJSON log feed
struct NdjsonState {
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    buf: Vec<u8>,
    ready: VecDeque<LogEntry>,
}

/// Turn a chunked HTTP body into a stream of parsed log entries.
///
/// Chunks are split on newline bytes only, so multi-byte characters
/// straddling a chunk boundary stay intact. A trailing partial line is
/// dropped when the connection closes; the streamer re-requests it on
/// reconnect.
fn ndjson_stream(body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>) -> LogStream {
    let state = NdjsonState {
        body,
        buf: Vec::new(),
        ready: VecDeque::new(),
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(entry) = st.ready.pop_front() {
                return Some((Ok(entry), st));
            }

            match st.body.next().await {
                Some(Ok(chunk)) => {
                    st.buf.extend_from_slice(&chunk);
                    while let Some(pos) = st.buf.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = st.buf.drain(..=pos).collect();
                        let line = &line[..line.len() - 1];
                        if line.iter().all(|b| b.is_ascii_whitespace()) {
                            continue;
                        }
                        match serde_json::from_slice::<LogEntry>(line) {
                            Ok(entry) => st.ready.push_back(entry),
                            Err(e) => return Some((Err(e.into()), st)),
                        }
                    }
                }
                Some(Err(e)) => return Some((Err(e.into()), st)),
                None => return None,
            }
        }
    })
    .boxed()
}

#[async_trait]
impl PlatformApi for HttpPlatform {
    async fn publish_source(&self, app_id: &str, branch: &str) -> Result<PublishReceipt, CliError> {
        let path = format!("/applications/{}/deployments", app_id);
        let body = serde_json::json!({ "branch": branch });
        self.post(&path, &body).await
    }

    async fn deployment_status(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> Result<DeployState, CliError> {
        let path = format!("/applications/{}/deployments/{}", app_id, deployment_id);
        let response: StatusResponse = self.get(&path).await?;
        Ok(response.state)
    }

    async fn request_cancel(&self, app_id: &str, deployment_id: &str) -> Result<(), CliError> {
        let path = format!("/applications/{}/deployments/{}/cancel", app_id, deployment_id);
        self.post_unit(&path, &serde_json::json!({})).await
    }

    async fn stream_logs(&self, app_id: &str, since: Option<u64>) -> Result<LogStream, CliError> {
        let mut url = format!("{}/applications/{}/logs", self.base_url, app_id);
        if let Some(token) = since {
            url.push_str(&format!("?since={}", token));
        }
        debug!("GET {} (log stream)", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();

        Ok(ndjson_stream(body))
    }

    async fn list_deployments(
        &self,
        app_id: &str,
        scope: ActivityScope,
    ) -> Result<Vec<Deployment>, CliError> {
        let path = format!(
            "/applications/{}/deployments?scope={}",
            app_id,
            scope.as_query_str()
        );
        let response: DeploymentListResponse = self.get(&path).await?;
        Ok(response.deployments)
    }

    async fn create_application(&self, req: &CreateApplication) -> Result<Application, CliError> {
        self.post("/applications", req).await
    }

    async fn stop_application(&self, app_id: &str) -> Result<(), CliError> {
        let path = format!("/applications/{}/stop", app_id);
        self.post_unit(&path, &serde_json::json!({})).await
    }

    async fn get_application(&self, app_id: &str) -> Result<Application, CliError> {
        let path = format!("/applications/{}", app_id);
        self.get(&path).await
    }

    async fn list_env(&self, app_id: &str) -> Result<Vec<EnvVar>, CliError> {
        let path = format!("/applications/{}/env", app_id);
        self.get(&path).await
    }

    async fn set_env(&self, app_id: &str, name: &str, value: &str) -> Result<(), CliError> {
        let path = format!("/applications/{}/env/{}", app_id, name);
        let body = serde_json::json!({ "value": value });
        self.put_unit(&path, &body).await
    }

    async fn remove_env(&self, app_id: &str, name: &str) -> Result<(), CliError> {
        let path = format!("/applications/{}/env/{}", app_id, name);
        self.delete(&path).await
    }

    async fn list_domains(&self, app_id: &str) -> Result<Vec<String>, CliError> {
        let path = format!("/applications/{}/domains", app_id);
        self.get(&path).await
    }

    async fn add_domain(&self, app_id: &str, fqdn: &str) -> Result<(), CliError> {
        let path = format!("/applications/{}/domains", app_id);
        let body = serde_json::json!({ "fqdn": fqdn });
        self.post_unit(&path, &body).await
    }

    async fn remove_domain(&self, app_id: &str, fqdn: &str) -> Result<(), CliError> {
        let path = format!("/applications/{}/domains/{}", app_id, fqdn);
        self.delete(&path).await
    }
}
