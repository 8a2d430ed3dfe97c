//! `nimbus activity` — show recent deployments

use clap::Args;
use colored::Colorize;

use crate::activity::ActivityReporter;
use crate::commands::{render_state, Context, TargetArgs};
use crate::errors::CliError;

#[derive(Debug, Args)]
pub struct ActivityArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Show all activity instead of recent deployments only
    #[arg(long)]
    pub show_all: bool,
}

pub async fn execute(ctx: &Context, args: ActivityArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    let reporter = ActivityReporter::new(ctx.platform.as_ref());
    let deployments = reporter.list(&app, args.show_all).await?;

    if deployments.is_empty() {
        println!("No deployments yet for {}", app.name.bold());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<20} {:<10} {:<14} {}",
            "STARTED", "STATE", "REVISION", "DEPLOYMENT"
        )
        .bold()
    );
    for d in &deployments {
        println!(
            "{:<20} {} {:<14} {}",
            d.started_at.format("%Y-%m-%d %H:%M:%S"),
            render_state(d.state),
            d.revision,
            d.id
        );
    }
    Ok(())
}
