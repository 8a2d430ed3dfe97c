//! `nimbus unlink` — remove an alias binding

use clap::Args;

use crate::commands::Context;
use crate::errors::CliError;

#[derive(Debug, Args)]
pub struct UnlinkArgs {
    /// Application alias
    pub alias: String,
}

pub async fn execute(ctx: &Context, args: UnlinkArgs) -> Result<(), CliError> {
    let removed = ctx.registry.unbind(&args.alias).await?;
    if !removed {
        return Err(CliError::UnknownAlias(args.alias));
    }
    println!("Unlinked '{}'", args.alias);
    Ok(())
}
