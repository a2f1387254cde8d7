//! # herald-reconcile
//!
//! Announcement template reconciliation: key matching, stamps and
//! fingerprints, the publish / clear / prune-and-lock policies, reports,
//! and the run pipeline shared by the CLI.
//!
//! Call [`run`] with a [`Plan`] to read a template, reconcile it, and publish
//! the result through a [`herald_core::TemplateStore`].

pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod matcher;
pub mod notify;
pub mod pipeline;
pub mod policy;
pub mod report;
pub mod stamp;

pub use diff::template_diff;
pub use error::ReconcileError;
pub use fingerprint::{canonical_json, compute_fingerprint};
pub use matcher::{is_announcement_key, KeyMatcher};
pub use notify::NotifyOutcome;
pub use pipeline::{run, RunOptions, RunOutcome};
pub use policy::{reconcile, Plan, ReconciliationResult};
pub use stamp::{clear_tag, compute_local_stamp, StampSource, Stamper};
