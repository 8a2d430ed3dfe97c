//! `nimbus env` — manage application environment variables

use clap::{Args, Subcommand};

use crate::commands::{Context, TargetArgs};
use crate::errors::CliError;
use crate::platform::PlatformApi;

#[derive(Debug, Args)]
pub struct EnvArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Option<EnvCommand>,
}

#[derive(Debug, Subcommand)]
pub enum EnvCommand {
    /// Add or update an environment variable
    Set {
        /// Name of the environment variable
        name: String,
        /// Value of the environment variable
        value: String,
    },
    /// Remove an environment variable
    Rm {
        /// Name of the environment variable
        name: String,
    },
}

pub async fn execute(ctx: &Context, args: EnvArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    match args.command {
        None => {
            let vars = ctx.platform.list_env(&app.id).await?;
            for var in vars {
                println!("{}={}", var.name, var.value);
            }
            Ok(())
        }
        Some(EnvCommand::Set { name, value }) => {
            ctx.platform.set_env(&app.id, &name, &value).await?;
            println!("Set {} on {}", name, app.name);
            Ok(())
        }
        Some(EnvCommand::Rm { name }) => {
            ctx.platform.remove_env(&app.id, &name).await?;
            println!("Removed {} from {}", name, app.name);
            Ok(())
        }
    }
}
