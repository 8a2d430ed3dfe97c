//! `nimbus deploy` — publish the source tree and drive the deployment

use std::time::Duration;

use clap::Args;
use colored::Colorize;
use tracing::warn;

use crate::commands::{print_log_event, Context, TargetArgs};
use crate::deploy::{DeploymentDriver, DriverOptions, SourcePublisher};
use crate::errors::CliError;
use crate::logstream::{LogStreamer, StreamOptions};
use crate::models::deployment::DeployState;

/// How long to wait for the log stream to flush after the driver ends
const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Branch to push (current branch by default)
    #[arg(short, long, default_value = "")]
    pub branch: String,
}

pub async fn execute(ctx: &Context, args: DeployArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    let options = DriverOptions {
        poll_interval: ctx.settings.driver.poll_interval(),
        retry_ceiling: ctx.settings.driver.retry_ceiling,
        backoff: ctx.settings.driver.backoff(),
    };
    let mut driver = DeploymentDriver::new(ctx.platform.clone(), &app.id, options);

    let publisher = SourcePublisher::new(ctx.platform.as_ref());
    let receipt = publisher.publish(&app, &args.branch).await?;
    println!(
        "Deploying {} (revision {}, deployment {})",
        app.name.bold(),
        receipt.revision,
        receipt.deployment_id
    );
    driver.mark_published(receipt)?;

    // Log feed runs concurrently with status polling; it follows the
    // driver's state channel and completes at the terminal state.
    let state_rx = driver.subscribe();
    let mut streamer = LogStreamer::new(
        ctx.platform.clone(),
        &app.id,
        None,
        StreamOptions {
            reconnect: ctx.settings.stream.reconnect_backoff(),
        },
    );
    let log_task = tokio::spawn(async move {
        if let Err(e) = streamer
            .run(print_log_event, Some(state_rx), tokio::time::sleep)
            .await
        {
            warn!("Log stream ended with error: {}", e);
        }
    });

    let outcome = driver.run(tokio::time::sleep).await;

    if outcome.is_err() {
        // Without a terminal state the streamer would keep going
        log_task.abort();
        let _ = log_task.await;
    } else if tokio::time::timeout(LOG_FLUSH_TIMEOUT, log_task).await.is_err() {
        warn!("Gave up waiting for the log stream to flush");
    }

    match outcome {
        Ok(DeployState::Running) => {
            println!("{}", "Deployment successful: application is running".green());
            Ok(())
        }
        Ok(DeployState::Failed) => {
            println!("{}", "Deployment failed on the platform".red());
            Err(CliError::DeploymentFailed)
        }
        Ok(DeployState::Cancelled) => {
            println!("{}", "Deployment was cancelled".yellow());
            Err(CliError::DeploymentCancelled)
        }
        Ok(other) => Err(CliError::Internal(format!(
            "driver stopped in non-terminal state '{}'",
            other
        ))),
        Err(e) => {
            if let CliError::DriverUnreachable { .. } = e {
                println!(
                    "{}",
                    "Lost contact with the platform; the deployment may still be running. \
                     Check `nimbus activity` to re-attach."
                        .yellow()
                );
            }
            Err(e)
        }
    }
}
