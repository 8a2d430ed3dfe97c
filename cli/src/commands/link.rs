//! `nimbus link` — bind an existing application to this working tree

use clap::Args;
use colored::Colorize;

use crate::commands::Context;
use crate::errors::CliError;
use crate::platform::PlatformApi;

#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Application ID
    pub app_id: String,

    /// Short name for the application
    #[arg(short, long)]
    pub alias: Option<String>,
}

pub async fn execute(ctx: &Context, args: LinkArgs) -> Result<(), CliError> {
    let app = ctx.platform.get_application(&args.app_id).await?;

    let alias = args.alias.unwrap_or_else(|| app.name.clone());
    ctx.registry.bind(&alias, &app).await?;

    println!(
        "{} {} ({}) as '{}'",
        "Linked".green(),
        app.name.bold(),
        app.id,
        alias
    );
    Ok(())
}
