//! Source publishing

use tracing::info;

use crate::errors::CliError;
use crate::models::application::Application;
use crate::models::deployment::PublishReceipt;
use crate::platform::PlatformApi;

/// Pushes the local source tree to the platform's ingestion endpoint.
///
/// A single blocking step with no state machine of its own: it either
/// returns the receipt for the revision the platform will build, or
/// fails and no deployment exists.
pub struct SourcePublisher<'a, P: PlatformApi + ?Sized> {
    platform: &'a P,
}

impl<'a, P: PlatformApi + ?Sized> SourcePublisher<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    /// Publish the source tree for `app`. An empty branch means the
    /// platform's default.
    pub async fn publish(
        &self,
        app: &Application,
        branch: &str,
    ) -> Result<PublishReceipt, CliError> {
        let shown_branch = if branch.is_empty() { "default" } else { branch };
        info!("Publishing source for {} (branch: {})", app.name, shown_branch);

        match self.platform.publish_source(&app.id, branch).await {
            Ok(receipt) => {
                info!(
                    "Published revision {} (deployment {})",
                    receipt.revision, receipt.deployment_id
                );
                Ok(receipt)
            }
            Err(CliError::Api { status: 409, body }) => Err(CliError::PublishConflict(body)),
            Err(CliError::Api { status, body }) if status < 500 => {
                Err(CliError::PublishRejected(format!("{}: {}", status, body)))
            }
            Err(e) => Err(e),
        }
    }
}
