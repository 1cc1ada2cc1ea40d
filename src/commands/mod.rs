//! Command dispatch and handlers.

pub mod apply;
pub mod list;

use crate::cli::{Cli, Command};
use crate::config::StageConfig;
use crate::context::ServiceContext;
use crate::logging;

/// Dispatch a parsed command to its handler.
///
/// Loads the layered configuration and starts logging before running the
/// command against a live service context.
///
/// # Errors
///
/// Returns an error string if configuration loading or the command fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let config = StageConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(err) = logging::init_logging(level) {
        eprintln!("Warning: {err}");
    }

    let ctx = ServiceContext::live();
    dispatch_with_context(&cli.command, &ctx, &config)
}

/// Dispatch a command with the given service context and configuration.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &StageConfig,
) -> Result<(), String> {
    match command {
        Command::Apply(args) => apply::run(ctx, config, args),
        Command::List(args) => list::run(ctx, config, args),
    }
}
