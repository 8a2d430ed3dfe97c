//! Deployment activity reporting

use crate::errors::CliError;
use crate::models::application::Application;
use crate::models::deployment::Deployment;
use crate::platform::{ActivityScope, PlatformApi};

/// Read-only summarizer of past and ongoing deployments.
///
/// Built on the same status representation as the driver, but it
/// never drives anything: one remote query, most recent first.
pub struct ActivityReporter<'a, P: PlatformApi + ?Sized> {
    platform: &'a P,
}

impl<'a, P: PlatformApi + ?Sized> ActivityReporter<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    pub async fn list(
        &self,
        app: &Application,
        show_all: bool,
    ) -> Result<Vec<Deployment>, CliError> {
        let scope = if show_all {
            ActivityScope::All
        } else {
            ActivityScope::Recent
        };

        let mut deployments = self
            .platform
            .list_deployments(&app.id, scope)
            .await
            .map_err(|e| CliError::ReportUnavailable(e.to_string()))?;

        deployments.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(deployments)
    }
}
