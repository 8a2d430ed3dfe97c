//! `nimbus create` — create an application and bind its alias

use clap::Args;
use colored::Colorize;

use crate::commands::Context;
use crate::errors::CliError;
use crate::models::application::CreateApplication;
use crate::platform::PlatformApi;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Application name
    pub name: String,

    /// Organisation ID
    #[arg(short, long)]
    pub org: Option<String>,

    /// Short name for the application
    #[arg(short, long)]
    pub alias: Option<String>,

    /// Instance type
    #[arg(short = 't', long = "type", default_value = "nano")]
    pub instance_type: String,

    /// Region, e.g. 'par' or 'mtl'
    #[arg(short, long, default_value = "par")]
    pub region: String,
}

pub async fn execute(ctx: &Context, args: CreateArgs) -> Result<(), CliError> {
    let req = CreateApplication {
        name: args.name.clone(),
        org_id: args.org.clone(),
        region: args.region.clone(),
        instance_type: args.instance_type.clone(),
    };

    let app = ctx.platform.create_application(&req).await?;

    let alias = args.alias.unwrap_or_else(|| app.name.clone());
    ctx.registry.bind(&alias, &app).await?;

    println!(
        "{} {} ({}) in {}, linked as '{}'",
        "Created".green(),
        app.name.bold(),
        app.id,
        app.region,
        alias
    );
    Ok(())
}
