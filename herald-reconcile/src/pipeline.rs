//! Shared run entrypoint used by the CLI.
//!
//! read → (list-only) → reconcile → (dry-run) → apply → validate → publish →
//! notify. Store failures abort; push failures are recorded on the outcome.

use herald_core::{PushTransport, Template, TemplateStore};

use crate::error::{store_err, ReconcileError};
use crate::notify::{reconcile_message, send_best_effort, NotifyOutcome};
use crate::policy::{reconcile, Plan, ReconciliationResult};

/// Run switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute and report, never validate or publish.
    pub dry_run: bool,
    /// Report the matched keys and stop.
    pub list_only: bool,
    /// Topic to notify after a successful publish. `None` disables the push.
    pub notify_topic: Option<String>,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Listed {
        matched: Vec<String>,
        total: usize,
    },
    DryRun {
        before: Template,
        result: ReconciliationResult,
    },
    Published {
        before: Template,
        result: ReconciliationResult,
        version_number: String,
        notification: NotifyOutcome,
    },
}

impl RunOutcome {
    pub fn result(&self) -> Option<&ReconciliationResult> {
        match self {
            RunOutcome::Listed { .. } => None,
            RunOutcome::DryRun { result, .. } | RunOutcome::Published { result, .. } => {
                Some(result)
            }
        }
    }
}

/// Run `plan` against `store`.
///
/// The template is read once; a concurrent edit between the read and the
/// publish surfaces as a conflict and is not retried.
pub fn run(
    store: &dyn TemplateStore,
    push: Option<&dyn PushTransport>,
    plan: &Plan,
    options: &RunOptions,
) -> Result<RunOutcome, ReconcileError> {
    let mode = plan.mode;
    let before = store.get().map_err(store_err(mode))?;
    tracing::info!(
        "{mode}: read {} parameter(s) from {}",
        before.parameters.len(),
        store.describe()
    );

    if options.list_only {
        return Ok(RunOutcome::Listed {
            matched: plan.matcher().matching(before.keys()),
            total: before.parameters.len(),
        });
    }

    let result = reconcile(&before, plan);
    if options.dry_run {
        return Ok(RunOutcome::DryRun { before, result });
    }

    let mut next = before.clone();
    result.apply_to(&mut next);
    let mut validated = store.validate(&next).map_err(store_err(mode))?;
    if validated.etag.is_none() {
        validated.etag = next.etag.clone();
    }
    let receipt = store.publish(&validated).map_err(store_err(mode))?;
    tracing::info!("{mode}: published version {}", receipt.version_number);

    let notification = match (options.notify_topic.as_deref(), push) {
        (Some(topic), Some(transport)) => {
            send_best_effort(transport, &reconcile_message(topic, &result))
        }
        (Some(topic), None) => {
            tracing::warn!("no push transport configured; not notifying '{topic}'");
            NotifyOutcome::Skipped
        }
        (None, _) => NotifyOutcome::Skipped,
    };

    Ok(RunOutcome::Published {
        before,
        result,
        version_number: receipt.version_number,
        notification,
    })
}
