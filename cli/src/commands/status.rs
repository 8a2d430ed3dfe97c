//! `nimbus status` — application record and latest deployment state

use clap::Args;
use colored::Colorize;

use crate::commands::{Context, TargetArgs};
use crate::errors::CliError;
use crate::models::deployment::DeployState;
use crate::platform::{ActivityScope, PlatformApi};

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn execute(ctx: &Context, args: StatusArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    // Registry entries can lag behind the platform; show fresh data
    let app = ctx.platform.get_application(&app.id).await?;

    println!("{} ({})", app.name.bold(), app.id);
    println!("  region:   {}", app.region);
    println!("  instance: {}", app.instance_type);
    if let Some(org) = &app.org_id {
        println!("  org:      {}", org);
    }

    let deployments = ctx
        .platform
        .list_deployments(&app.id, ActivityScope::Recent)
        .await?;

    match deployments.first() {
        Some(d) => {
            let state = d.state.to_string();
            let state = match d.state {
                DeployState::Running => state.green(),
                DeployState::Failed => state.red(),
                DeployState::Cancelled => state.yellow(),
                _ => state.cyan(),
            };
            println!(
                "  last deployment: {} (revision {}, seen {})",
                state,
                d.revision,
                d.last_seen_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        None => println!("  last deployment: never deployed"),
    }
    Ok(())
}
