//! # herald-watch
//!
//! Publish watcher: notices new Remote Config template versions and wakes
//! clients with a `newAnnouncement` push. Also handles inbound publish
//! events directly ([`handle_publish_event`]).

pub mod error;
pub mod event;
pub mod logging;
pub mod runtime;
pub mod state;

pub use error::WatchError;
pub use event::{handle_publish_event, PublishEvent, OBSERVED_UPDATE};
pub use logging::{init_tracing, level_for_verbosity};
pub use runtime::{poll_once, start_blocking, watch, PollOutcome, WatchOptions, WatchSummary};
pub use state::{state_path_at, WatchState};
