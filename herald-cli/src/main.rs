//! Herald: announcement template reconciler CLI.
//!
//! # Usage
//!
//! ```text
//! herald publish --file announcements.json [--prefix P] [--no-notify] [--dry-run] [--diff]
//! herald publish --title T --text X [--published-at P] [--id I]
//! herald clear [--blank-card] [--prefix P | --no-prefix] [--list-only] [--dry-run] [--notify]
//! herald prune [--list-only] [--dry-run] [--notify]
//! herald status [--prefix P] [--json]
//! herald ping [--version V]
//! herald refresh [--year Y]
//! herald watch [--interval SECS] [--once]
//! herald on-publish [--event PATH|-]
//! herald schedule validate [FILES…] [--bucket B (--year Y | --object O)] [--no-empty-iqamah]
//! ```

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{
    context::GlobalArgs,
    notify::{PingArgs, RefreshArgs},
    reconcile::{ClearArgs, PruneArgs, PublishArgs},
    schedule::ScheduleCommand,
    status::StatusArgs,
    watch::{OnPublishArgs, WatchArgs},
};
use herald_core::InputError;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "herald",
    version,
    about = "Reconcile in-app announcements in a remote config template",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish a list of announcements.
    Publish(PublishArgs),

    /// Remove all announcements and leave a placeholder or blank card.
    Clear(ClearArgs),

    /// Collapse every announcement key, in every namespace, to the five legacy keys.
    Prune(PruneArgs),

    /// Show announcement-related template parameters.
    Status(StatusArgs),

    /// Send a "check for announcements" push.
    Ping(PingArgs),

    /// Ask clients to refetch the prayer schedule.
    Refresh(RefreshArgs),

    /// Poll the template and push when a new version is published.
    Watch(WatchArgs),

    /// Handle one publish event (JSON from a file or stdin).
    OnPublish(OnPublishArgs),

    /// Prayer schedule tools.
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    herald_watch::init_tracing(
        herald_watch::level_for_verbosity(cli.global.verbose),
        cli.global.log_json,
    );

    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            exit_code_for(&err)
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    let global = cli.global;
    match cli.command {
        Commands::Publish(args) => args.run(&global),
        Commands::Clear(args) => args.run(&global),
        Commands::Prune(args) => args.run(&global),
        Commands::Status(args) => args.run(&global),
        Commands::Ping(args) => args.run(&global),
        Commands::Refresh(args) => args.run(&global),
        Commands::Watch(args) => args.run(&global),
        Commands::OnPublish(args) => args.run(&global),
        Commands::Schedule { command } => commands::schedule::run(command, &global),
    }
}

/// Bad input exits 2; everything else exits 1.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err.chain().any(|cause| cause.downcast_ref::<InputError>().is_some()) {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}
