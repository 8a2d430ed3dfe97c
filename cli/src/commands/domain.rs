//! `nimbus domain` — manage application domain names

use clap::{Args, Subcommand};

use crate::commands::{Context, TargetArgs};
use crate::errors::CliError;
use crate::platform::PlatformApi;

#[derive(Debug, Args)]
pub struct DomainArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Option<DomainCommand>,
}

#[derive(Debug, Subcommand)]
pub enum DomainCommand {
    /// Add a domain name to the application
    Add {
        /// Domain name
        fqdn: String,
    },
    /// Remove a domain name from the application
    Rm {
        /// Domain name
        fqdn: String,
    },
}

pub async fn execute(ctx: &Context, args: DomainArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    match args.command {
        None => {
            let domains = ctx.platform.list_domains(&app.id).await?;
            for fqdn in domains {
                println!("{}", fqdn);
            }
            Ok(())
        }
        Some(DomainCommand::Add { fqdn }) => {
            ctx.platform.add_domain(&app.id, &fqdn).await?;
            println!("Added {} to {}", fqdn, app.name);
            Ok(())
        }
        Some(DomainCommand::Rm { fqdn }) => {
            ctx.platform.remove_domain(&app.id, &fqdn).await?;
            println!("Removed {} from {}", fqdn, app.name);
            Ok(())
        }
    }
}
