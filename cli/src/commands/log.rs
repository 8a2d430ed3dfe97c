//! `nimbus log` — fetch application logs, continuously

use clap::Args;
use tracing::info;

use crate::commands::{print_log_event, Context, TargetArgs};
use crate::errors::CliError;
use crate::logstream::{LogStreamer, StreamOptions};

#[derive(Debug, Args)]
pub struct LogArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Resume after this sequence token
    #[arg(long)]
    pub since: Option<u64>,
}

pub async fn execute(ctx: &Context, args: LogArgs) -> Result<(), CliError> {
    let app = ctx.resolve_app(&args.target).await?;

    let mut streamer = LogStreamer::new(
        ctx.platform.clone(),
        &app.id,
        args.since,
        StreamOptions {
            reconnect: ctx.settings.stream.reconnect_backoff(),
        },
    );

    // Standalone mode: the stream never ends on its own, the user
    // interrupt is the only way out.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, closing log stream");
            Ok(())
        }
        result = streamer.run(print_log_event, None, tokio::time::sleep) => result,
    }
}
