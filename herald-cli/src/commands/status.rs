//! `herald status`: announcement-related parameters in the live template.

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use herald_core::Template;
use herald_reconcile::{policy::keys, KeyMatcher};

use super::context::{Context, GlobalArgs};

/// Values wider than this are cut in the table (JSON output is never cut).
const MAX_CELL_CHARS: usize = 60;

/// Arguments for `herald status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show unprefixed keys and keys under this prefix.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    store: String,
    version: Option<String>,
    total_keys: usize,
    fingerprint: Option<String>,
    keys: Vec<KeyJson>,
}

#[derive(Serialize)]
struct KeyJson {
    key: String,
    value: Option<String>,
}

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "value")]
    value: String,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ctx = Context::load(global)?;
        let matcher = match self.prefix.as_deref() {
            Some(raw) => KeyMatcher::standard(ctx.prefix(Some(raw), false)?),
            None => KeyMatcher::prune(),
        };

        let store = ctx.store()?;
        let template = store
            .get()
            .with_context(|| format!("cannot read template from {}", store.describe()))?;
        let matched = matcher.matching(template.keys());

        if self.json {
            print_json(&store.describe(), &template, &matched)?;
        } else {
            print_table(&store.describe(), &template, &matched);
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_json(store: &str, template: &Template, matched: &[String]) -> Result<()> {
    let payload = StatusJson {
        store: store.to_string(),
        version: template.version_number(),
        total_keys: template.parameters.len(),
        fingerprint: template.value(keys::ANN_FP).map(str::to_string),
        keys: matched
            .iter()
            .map(|key| KeyJson {
                key: key.clone(),
                value: template.value(key).map(str::to_string),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(store: &str, template: &Template, matched: &[String]) {
    println!(
        "Herald v{} | {} | version {} | {} of {} key(s) are announcements",
        env!("CARGO_PKG_VERSION"),
        store,
        template.version_number().as_deref().unwrap_or("?"),
        matched.len(),
        template.parameters.len(),
    );

    if matched.is_empty() {
        println!("{}", "No announcement keys in the template.".bright_black());
        return;
    }

    let rows: Vec<KeyRow> = matched
        .iter()
        .map(|key| KeyRow {
            key: key.clone(),
            value: cell(template.value(key)),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn cell(value: Option<&str>) -> String {
    match value {
        None => "(no default)".to_string(),
        Some(v) if v.chars().count() > MAX_CELL_CHARS => {
            let cut: String = v.chars().take(MAX_CELL_CHARS).collect();
            format!("{cut}...")
        }
        Some(v) => v.to_string(),
    }
}
