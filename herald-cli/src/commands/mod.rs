pub mod context;
pub mod notify;
pub mod reconcile;
pub mod schedule;
pub mod status;
pub mod watch;
