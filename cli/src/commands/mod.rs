//! CLI command handlers

pub mod activity;
pub mod cancel;
pub mod create;
pub mod deploy;
pub mod domain;
pub mod env;
pub mod link;
pub mod log;
pub mod status;
pub mod stop;
pub mod unlink;

use std::sync::Arc;

use clap::Args;
use colored::Colorize;

use crate::config::Settings;
use crate::errors::CliError;
use crate::logstream::LogEvent;
use crate::models::application::Application;
use crate::models::deployment::DeployState;
use crate::models::log::LogSource;
use crate::platform::HttpPlatform;
use crate::registry::{AliasRegistry, AliasResolver};

/// Capabilities handed to every command handler.
///
/// Built once in `main` before any command executes; a failure here is
/// an ordinary error, not a global channel.
pub struct Context {
    pub platform: Arc<HttpPlatform>,
    pub registry: AliasRegistry,
    pub settings: Settings,
}

impl Context {
    pub fn init(settings: Settings) -> Result<Self, CliError> {
        let token = settings.api_token()?;
        let platform = Arc::new(HttpPlatform::new(&settings.api.base_url, token)?);
        let cwd = std::env::current_dir()?;
        let registry = AliasRegistry::discover(&cwd);

        Ok(Self {
            platform,
            registry,
            settings,
        })
    }

    /// Resolve the application a command targets
    pub async fn resolve_app(&self, target: &TargetArgs) -> Result<Application, CliError> {
        AliasResolver::new(&self.registry, self.platform.as_ref())
            .resolve(target.alias.as_deref(), target.app.as_deref())
            .await
    }
}

/// Application selector shared by most commands
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Short name for the application
    #[arg(short, long)]
    pub alias: Option<String>,

    /// Explicit application ID (bypasses the alias registry)
    #[arg(long)]
    pub app: Option<String>,
}

/// Render a deployment state with a stable width and a color
pub(crate) fn render_state(state: DeployState) -> colored::ColoredString {
    let padded = format!("{:<10}", state.to_string());
    match state {
        DeployState::Running => padded.green(),
        DeployState::Failed => padded.red(),
        DeployState::Cancelled => padded.yellow(),
        _ => padded.cyan(),
    }
}

/// Print a log event to stdout
pub(crate) fn print_log_event(event: LogEvent) {
    match event {
        LogEvent::Entry(entry) => {
            let source = match entry.source {
                LogSource::Build => "build".cyan(),
                LogSource::Runtime => "  app".magenta(),
            };
            println!(
                "{} {} {}",
                entry
                    .timestamp
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .dimmed(),
                source,
                entry.message
            );
        }
        LogEvent::Gap {
            expected,
            resumed_at,
        } => {
            println!(
                "{}",
                format!(
                    "--- log entries {}..{} are no longer available ---",
                    expected,
                    resumed_at - 1
                )
                .yellow()
            );
        }
    }
}
