//! `herald watch` / `herald on-publish`: wake clients after template publishes.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;

use herald_watch::{handle_publish_event, start_blocking, PublishEvent, WatchOptions};

use super::context::{Context, GlobalArgs};

/// Arguments for `herald watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between polls (default from config).
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Poll once and exit.
    #[arg(long)]
    pub once: bool,

    /// Push topic (default from config).
    #[arg(long)]
    pub topic: Option<String>,
}

impl WatchArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let interval = self.interval.unwrap_or(ctx.config.watch.interval_secs).max(1);
        let options = WatchOptions {
            interval: Duration::from_secs(interval),
            once: self.once,
            topic: ctx.topic(self.topic.as_deref()),
            state_path: ctx.watch_state_path()?,
        };

        let store = ctx.store()?;
        let transport = ctx.push()?;
        if !self.once {
            println!(
                "watching {} every {interval}s (ctrl-c to stop)",
                store.describe()
            );
        }
        let summary = start_blocking(store, transport, &options).context("watcher failed")?;
        println!(
            "✓ watcher stopped: {} poll(s), {} push(es), {} error(s)",
            summary.polls, summary.notifications, summary.errors
        );
        Ok(ExitCode::SUCCESS)
    }
}

/// Arguments for `herald on-publish`.
#[derive(Args, Debug)]
pub struct OnPublishArgs {
    /// Event JSON file, or `-` for stdin.
    #[arg(long, value_name = "PATH", default_value = "-")]
    pub event: PathBuf,

    /// Push topic (default from config).
    #[arg(long)]
    pub topic: Option<String>,
}

impl OnPublishArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let transport = ctx.push()?;

        let raw = read_event(&self.event)?;
        let event = PublishEvent::from_json(&raw).context("invalid publish event")?;
        let topic = ctx.topic(self.topic.as_deref());
        let message_id = handle_publish_event(&event, transport.as_ref(), &topic)
            .context("new-announcement push failed")?;
        println!(
            "✓ version {} ({}) → push sent to '{topic}' ({message_id})",
            if event.version_number.is_empty() { "?" } else { &event.version_number },
            if event.update_type.is_empty() { "unknown update" } else { &event.update_type },
        );
        Ok(ExitCode::SUCCESS)
    }
}

fn read_event(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read event from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))
}
