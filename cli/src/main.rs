//! Nimbus CLI - Entry Point
//!
//! Command-line client for the Nimbus platform: link applications to a
//! working tree, manage their environment and domains, deploy them and
//! follow the deployment live.

use clap::{Parser, Subcommand};
use colored::Colorize;

use nimbus::commands::{self, Context};
use nimbus::config::Settings;
use nimbus::errors::CliError;
use nimbus::logs::{init_logging, LogOptions};

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(about = "CLI tool to manage and deploy applications on the Nimbus platform")]
#[command(version, long_version = nimbus::utils::long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a Nimbus application
    Create(commands::create::CreateArgs),
    /// Link this working tree to an existing Nimbus application
    Link(commands::link::LinkArgs),
    /// Unlink this working tree from a Nimbus application
    Unlink(commands::unlink::UnlinkArgs),
    /// Manage application environment variables
    Env(commands::env::EnvArgs),
    /// Manage application domain names
    Domain(commands::domain::DomainArgs),
    /// Fetch application logs, continuously
    Log(commands::log::LogArgs),
    /// Deploy an application
    Deploy(commands::deploy::DeployArgs),
    /// Cancel an ongoing deployment
    CancelDeploy(commands::cancel::CancelArgs),
    /// Stop a running application
    Stop(commands::stop::StopArgs),
    /// See the status of an application
    Status(commands::status::StatusArgs),
    /// Show last deployments of an application
    Activity(commands::activity::ActivityArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(None).await?;

    init_logging(LogOptions {
        log_level: settings.log_level.clone(),
        verbose: cli.verbose,
    })?;

    let ctx = Context::init(settings)?;

    match cli.command {
        Commands::Create(args) => commands::create::execute(&ctx, args).await,
        Commands::Link(args) => commands::link::execute(&ctx, args).await,
        Commands::Unlink(args) => commands::unlink::execute(&ctx, args).await,
        Commands::Env(args) => commands::env::execute(&ctx, args).await,
        Commands::Domain(args) => commands::domain::execute(&ctx, args).await,
        Commands::Log(args) => commands::log::execute(&ctx, args).await,
        Commands::Deploy(args) => commands::deploy::execute(&ctx, args).await,
        Commands::CancelDeploy(args) => commands::cancel::execute(&ctx, args).await,
        Commands::Stop(args) => commands::stop::execute(&ctx, args).await,
        Commands::Status(args) => commands::status::execute(&ctx, args).await,
        Commands::Activity(args) => commands::activity::execute(&ctx, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["nimbus", "deploy", "--alias", "web", "--branch", "main"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cancel_deploy_verb() {
        let cli = Cli::try_parse_from(["nimbus", "cancel-deploy", "--alias", "web"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::try_parse_from(["nimbus", "--verbose", "activity", "--show-all"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_stop_verb() {
        let cli = Cli::try_parse_from(["nimbus", "stop", "--alias", "web"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_unknown_command_rejected() {
        let cli = Cli::try_parse_from(["nimbus", "teleport"]);
        assert!(cli.is_err());
    }
}
