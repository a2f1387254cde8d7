//! `herald publish | clear | prune`: run a reconciliation against the template.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use herald_core::{
    input::{self, SingleItemFields},
    ClearVariant, NamespacePrefix, PushTransport,
};
use herald_reconcile::{
    notify::NotifyOutcome,
    report::{render, render_listing},
    run, template_diff, Plan, RunOptions, RunOutcome,
};

use super::context::{Context, GlobalArgs};

/// Flags shared by every reconciling command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunFlags {
    /// Compute and print the changes without validating or publishing.
    #[arg(long)]
    pub dry_run: bool,

    /// Also print a unified diff of the touched parameters.
    #[arg(long)]
    pub diff: bool,

    /// IANA timezone for the version stamp (default from config).
    #[arg(long, value_name = "ZONE")]
    pub tz: Option<String>,

    /// Compute the stamp with the system `date` command.
    #[arg(long)]
    pub stamp_via_shell: bool,

    /// Push topic (default from config).
    #[arg(long)]
    pub topic: Option<String>,
}

/// Arguments for `herald publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// JSON file holding an array of announcements.
    #[arg(long, short, value_name = "PATH", conflicts_with_all = ["title", "text", "published_at", "id"])]
    pub file: Option<PathBuf>,

    /// Single-item title.
    #[arg(long)]
    pub title: Option<String>,

    /// Single-item body text.
    #[arg(long)]
    pub text: Option<String>,

    /// Single-item publish timestamp (ISO-8601).
    #[arg(long)]
    pub published_at: Option<String>,

    /// Single-item id.
    #[arg(long)]
    pub id: Option<String>,

    /// Also write every key under this namespace prefix. Publish never
    /// falls back to the configured prefix.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Skip the "new announcement" push.
    #[arg(long)]
    pub no_notify: bool,

    #[command(flatten)]
    pub run: RunFlags,
}

impl PublishArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let items = match &self.file {
            Some(path) => input::load_items_from_file(path)
                .with_context(|| format!("cannot load announcements from {}", path.display()))?,
            None => input::single_item(SingleItemFields {
                id: self.id.clone(),
                title: self.title.clone(),
                text: self.text.clone(),
                published_at: self.published_at.clone(),
            })?,
        };
        let prefix = self
            .prefix
            .as_deref()
            .map(NamespacePrefix::parse)
            .transpose()?;
        let stamp = ctx
            .stamper(self.run.tz.as_deref(), self.run.stamp_via_shell)
            .now();

        let plan = Plan::publish(items, prefix, stamp);
        execute(&ctx, &plan, &self.run, false, !self.no_notify)
    }
}

/// Arguments for `herald clear`.
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Write an inactive, empty card instead of the placeholder.
    #[arg(long)]
    pub blank_card: bool,

    /// Namespace prefix whose keys are also cleared (default from config).
    #[arg(long, conflicts_with = "no_prefix")]
    pub prefix: Option<String>,

    /// Ignore prefixed keys.
    #[arg(long)]
    pub no_prefix: bool,

    /// Print the matched keys and exit.
    #[arg(long)]
    pub list_only: bool,

    /// Send a push after publishing.
    #[arg(long)]
    pub notify: bool,

    #[command(flatten)]
    pub run: RunFlags,
}

impl ClearArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let prefix = ctx.prefix(self.prefix.as_deref(), self.no_prefix)?;
        let variant = if self.blank_card {
            ClearVariant::Blank
        } else {
            ClearVariant::Placeholder
        };
        let stamp = ctx
            .stamper(self.run.tz.as_deref(), self.run.stamp_via_shell)
            .now();

        let plan = Plan::clear(variant, prefix, stamp);
        execute(&ctx, &plan, &self.run, self.list_only, self.notify)
    }
}

/// Arguments for `herald prune`.
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Print the matched keys and exit.
    #[arg(long)]
    pub list_only: bool,

    /// Send a push after publishing.
    #[arg(long)]
    pub notify: bool,

    #[command(flatten)]
    pub run: RunFlags,
}

impl PruneArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let stamp = ctx
            .stamper(self.run.tz.as_deref(), self.run.stamp_via_shell)
            .now();
        execute(&ctx, &Plan::prune(stamp), &self.run, self.list_only, self.notify)
    }
}

// ---------------------------------------------------------------------------
// Shared executor
// ---------------------------------------------------------------------------

fn execute(
    ctx: &Context,
    plan: &Plan,
    flags: &RunFlags,
    list_only: bool,
    notify: bool,
) -> Result<ExitCode> {
    let store = ctx.store()?;
    let wants_push = notify && !flags.dry_run && !list_only;
    let push = if wants_push { optional_push(ctx) } else { None };

    let options = RunOptions {
        dry_run: flags.dry_run,
        list_only,
        notify_topic: wants_push.then(|| ctx.topic(flags.topic.as_deref())),
    };

    let outcome = run(store.as_ref(), push.as_deref(), plan, &options).map_err(|err| {
        let conflict = err.is_conflict();
        let err = anyhow::Error::new(err);
        if conflict {
            err.context("template changed while reconciling; nothing was published, re-run to retry")
        } else {
            err
        }
    })?;

    print_outcome(plan, &outcome, flags.diff);
    Ok(ExitCode::SUCCESS)
}

/// Push is best effort: missing credentials downgrade to a warning.
fn optional_push(ctx: &Context) -> Option<Arc<dyn PushTransport>> {
    match ctx.push() {
        Ok(push) => Some(push),
        Err(err) => {
            eprintln!("{} push disabled: {err:#}", "warning:".yellow().bold());
            None
        }
    }
}

fn print_outcome(plan: &Plan, outcome: &RunOutcome, show_diff: bool) {
    match outcome {
        RunOutcome::Listed { matched, total } => {
            print!("{}", render_listing(plan.mode, matched, *total));
        }
        RunOutcome::DryRun { before, result } => {
            for line in render(result, &result.matched).lines() {
                println!("[dry-run] {line}");
            }
            if show_diff {
                print_diff(&template_diff(before, result));
            }
            println!("[dry-run] nothing published");
        }
        RunOutcome::Published {
            before,
            result,
            version_number,
            notification,
        } => {
            print!("{}", render(result, &result.matched));
            if show_diff {
                print_diff(&template_diff(before, result));
            }
            println!("✓ published template version {version_number}");
            match notification {
                NotifyOutcome::Skipped => {}
                NotifyOutcome::Sent { message_id } => println!("✓ push sent ({message_id})"),
                NotifyOutcome::Failed { error } => eprintln!(
                    "{} push failed (template is published): {error}",
                    "warning:".yellow().bold()
                ),
            }
        }
    }
}

fn print_diff(diff: &str) {
    if diff.is_empty() {
        println!("(no parameter changes)");
        return;
    }
    print!("{diff}");
    if !diff.ends_with('\n') {
        println!();
    }
}
