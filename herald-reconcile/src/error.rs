//! Error types for herald-reconcile.

use thiserror::Error;

use herald_core::{Mode, StoreError};

/// Errors that abort a reconciliation run. Push failures are not here; they
/// are reported on the outcome and never fail the run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Reading, validating or publishing the template failed.
    #[error("{mode} aborted: {source}")]
    Store {
        mode: Mode,
        #[source]
        source: StoreError,
    },
}

impl ReconcileError {
    /// `true` when the template changed between read and publish.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ReconcileError::Store {
                source: StoreError::Conflict { .. },
                ..
            }
        )
    }
}

/// Convenience constructor for [`ReconcileError::Store`].
pub(crate) fn store_err(mode: Mode) -> impl FnOnce(StoreError) -> ReconcileError {
    move |source| ReconcileError::Store { mode, source }
}
