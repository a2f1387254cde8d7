use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use herald_core::{PushTransport, TemplateStore};

use crate::error::{io_err, WatchError};
use crate::event::{handle_publish_event, PublishEvent};
use crate::state::{self, WatchState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Poll once and return.
    pub once: bool,
    pub topic: String,
    pub state_path: PathBuf,
}

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The template carries no version number.
    NoVersion,
    /// First version ever seen; recorded without notifying.
    FirstSeen(String),
    Unchanged(String),
    Notified { version: String, message_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub polls: u64,
    pub notifications: u64,
    pub errors: u64,
}

fn join_err(err: tokio::task::JoinError) -> WatchError {
    WatchError::Join(err.to_string())
}

/// Read the current version and notify if it moved since `state`.
///
/// `state` is only advanced after a successful push, so a failed send is
/// retried on the next poll.
pub async fn poll_once(
    store: Arc<dyn TemplateStore>,
    transport: Arc<dyn PushTransport>,
    topic: &str,
    state: &mut WatchState,
    state_path: &Path,
) -> Result<PollOutcome, WatchError> {
    let template = tokio::task::spawn_blocking(move || store.get())
        .await
        .map_err(join_err)??;
    let Some(version) = template.version_number() else {
        tracing::warn!("template has no version number; nothing to compare");
        return Ok(PollOutcome::NoVersion);
    };

    match state.last_version.as_deref() {
        None => {
            state.last_version = Some(version.clone());
            state::save(state_path, state)?;
            tracing::info!(version = %version, "recorded initial template version");
            Ok(PollOutcome::FirstSeen(version))
        }
        Some(seen) if seen == version => Ok(PollOutcome::Unchanged(version)),
        Some(seen) => {
            tracing::info!(from = %seen, to = %version, "template version changed");
            let event = PublishEvent::observed(version.clone());
            let topic = topic.to_string();
            let message_id = tokio::task::spawn_blocking(move || {
                handle_publish_event(&event, transport.as_ref(), &topic)
            })
            .await
            .map_err(join_err)??;

            state.last_version = Some(version.clone());
            state.last_notified_at = Some(Utc::now());
            state::save(state_path, state)?;
            Ok(PollOutcome::Notified {
                version,
                message_id,
            })
        }
    }
}

/// Poll every `options.interval` until `shutdown` resolves.
///
/// Poll failures are logged and retried on the next tick, except with
/// `options.once`, where the single poll's error is returned.
pub async fn watch<F>(
    store: Arc<dyn TemplateStore>,
    transport: Arc<dyn PushTransport>,
    options: &WatchOptions,
    shutdown: F,
) -> Result<WatchSummary, WatchError>
where
    F: Future<Output = ()>,
{
    let mut state = state::load(&options.state_path)?;
    let mut summary = WatchSummary::default();
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(
        store = %store.describe(),
        interval_secs = options.interval.as_secs(),
        topic = %options.topic,
        "watching for template publishes"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested, stopping watcher");
                break;
            }
            _ = ticker.tick() => {
                summary.polls += 1;
                let polled = poll_once(
                    store.clone(),
                    transport.clone(),
                    &options.topic,
                    &mut state,
                    &options.state_path,
                )
                .await;
                match polled {
                    Ok(PollOutcome::Notified { .. }) => summary.notifications += 1,
                    Ok(outcome) => tracing::debug!(?outcome, "poll complete"),
                    Err(err) if options.once => return Err(err),
                    Err(err) => {
                        summary.errors += 1;
                        tracing::warn!(error = %err, "poll failed; retrying next tick");
                    }
                }
                if options.once {
                    break;
                }
            }
        }
    }
    Ok(summary)
}

/// Run [`watch`] on a fresh runtime until Ctrl-C.
pub fn start_blocking(
    store: Arc<dyn TemplateStore>,
    transport: Arc<dyn PushTransport>,
    options: &WatchOptions,
) -> Result<WatchSummary, WatchError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(watch(store, transport, options, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }))
}
