//! `nimbus cancel-deploy` — request cancellation of the active deployment

use clap::Args;
use colored::Colorize;

use crate::commands::{Context, TargetArgs};
use crate::errors::CliError;
use crate::platform::{ActivityScope, PlatformApi};

#[derive(Debug, Args)]
pub struct CancelArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn execute(ctx: &Context, args: CancelArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    let deployments = ctx
        .platform
        .list_deployments(&app.id, ActivityScope::Recent)
        .await?;

    let active = deployments.iter().find(|d| !d.state.is_terminal());
    let deployment = match active {
        Some(d) => d,
        None => return Err(CliError::NoActiveDeployment),
    };

    if !deployment.state.is_cancellable() {
        return Err(CliError::InvalidCancelState(deployment.state));
    }

    ctx.platform
        .request_cancel(&app.id, &deployment.id)
        .await
        .map_err(|e| CliError::CancelRequestFailed(e.to_string()))?;

    println!(
        "{} deployment {} (state: {})",
        "Cancellation requested for".yellow(),
        deployment.id,
        deployment.state
    );
    println!("The platform cancels cooperatively; watch `nimbus activity` for the outcome.");
    Ok(())
}
