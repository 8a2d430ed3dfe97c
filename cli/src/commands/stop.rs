//! `nimbus stop` — stop a running application

use clap::Args;
use colored::Colorize;

use crate::commands::{Context, TargetArgs};
use crate::errors::CliError;
use crate::platform::PlatformApi;

#[derive(Debug, Args)]
pub struct StopArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn execute(ctx: &Context, args: StopArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    ctx.platform.stop_application(&app.id).await?;

    println!("{} {} ({})", "Stopped".yellow(), app.name.bold(), app.id);
    Ok(())
}
