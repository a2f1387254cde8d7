//! `herald ping` / `herald refresh`: manual pushes to the client topic.

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use chrono::{Datelike, Utc};
use clap::Args;

use herald_core::PushMessage;
use herald_reconcile::notify::{ping_message, refresh_message};

use super::context::{Context, GlobalArgs};

/// Arguments for `herald ping`.
#[derive(Args, Debug)]
pub struct PingArgs {
    /// Push topic (default from config).
    #[arg(long)]
    pub topic: Option<String>,

    /// Version value sent with the ping (default: the current stamp).
    #[arg(long)]
    pub version: Option<String>,

    /// IANA timezone for the default stamp.
    #[arg(long, value_name = "ZONE")]
    pub tz: Option<String>,
}

impl PingArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let version = match self.version {
            Some(v) => v,
            None => ctx.stamper(self.tz.as_deref(), false).now(),
        };
        let message = ping_message(&ctx.topic(self.topic.as_deref()), &version);
        send(&ctx, &message)
    }
}

/// Arguments for `herald refresh`.
#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Push topic (default from config).
    #[arg(long)]
    pub topic: Option<String>,

    /// Schedule year clients should refetch (default: this year).
    #[arg(long)]
    pub year: Option<i32>,
}

impl RefreshArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let year = self.year.unwrap_or_else(|| Utc::now().year());
        let message = refresh_message(&ctx.topic(self.topic.as_deref()), year);
        send(&ctx, &message)
    }
}

/// Manual pushes are the whole point of the command, so failure is an error.
fn send(ctx: &Context, message: &PushMessage) -> Result<ExitCode> {
    let transport = ctx.push()?;
    let message_id = transport
        .send(message)
        .with_context(|| format!("push to topic '{}' failed", message.topic))?;
    println!("✓ push sent to '{}' ({message_id})", message.topic);
    for (key, value) in &message.data {
        println!("  {key} = {value}");
    }
    Ok(ExitCode::SUCCESS)
}
