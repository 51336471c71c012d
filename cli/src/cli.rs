//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Manifest-driven bootstrap for compute fleets
#[derive(Parser)]
#[command(
    name = "flotilla",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run this instance's job: download, execute, upload, report
    Bootstrap(commands::bootstrap::BootstrapArgs),

    /// Upload a manifest and seed every job's status record
    Publish(commands::publish::PublishArgs),

    /// Block until every instance reports completion
    Wait(commands::wait::WaitArgs),

    /// Show per-instance progress records
    Status(commands::status::StatusArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            command,
        } = self;
        match command {
            Command::Version => {
                commands::version::run();
                Ok(())
            }
            Command::Bootstrap(args) => commands::bootstrap::run(&args).await,
            Command::Publish(args) => {
                let ctx = crate::output::OutputContext::new(no_color, quiet);
                commands::publish::run(&ctx, &args).await
            }
            Command::Wait(args) => {
                let ctx = crate::output::OutputContext::new(no_color, quiet);
                commands::wait::run(&ctx, &args).await
            }
            Command::Status(args) => {
                let ctx = crate::output::OutputContext::new(no_color, quiet);
                commands::status::run(&ctx, &args).await
            }
        }
    }
}
