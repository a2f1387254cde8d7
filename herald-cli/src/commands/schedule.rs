//! `herald schedule validate`: prayer schedule checks, local and remote.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use herald_schedule::{
    remote_object_path, validate_bytes, validate_file, Finding, ScheduleReport, Severity,
    ValidateOptions,
};

use super::context::{Context, GlobalArgs};

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Validate schedule JSON files and, optionally, the published copy.
    Validate(ValidateArgs),
}

/// Arguments for `herald schedule validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Local schedule files.
    pub files: Vec<PathBuf>,

    /// Storage bucket holding the published schedule.
    #[arg(long)]
    pub bucket: Option<String>,

    /// Year of the published schedule (object `prayer_times/<year>.json`).
    #[arg(long, conflicts_with = "object")]
    pub year: Option<i32>,

    /// Explicit object path inside the bucket.
    #[arg(long)]
    pub object: Option<String>,

    /// Treat an empty iqamah as an error.
    #[arg(long)]
    pub no_empty_iqamah: bool,
}

pub fn run(command: ScheduleCommand, global: &GlobalArgs) -> Result<ExitCode> {
    match command {
        ScheduleCommand::Validate(args) => args.run(global),
    }
}

#[derive(Debug, Default)]
struct Tally {
    errors: usize,
    warnings: usize,
}

impl ValidateArgs {
    fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let options = ValidateOptions {
            empty_iqamah_is_error: self.no_empty_iqamah,
            ..ValidateOptions::default()
        };
        let mut tally = Tally::default();

        for path in &self.files {
            match validate_file(path, options) {
                Ok(report) => print_report(&report, &mut tally),
                Err(err) => {
                    println!("{} {err}", "✖ FAIL".red().bold());
                    tally.errors += 1;
                }
            }
        }

        self.check_remote(global, options, &mut tally)?;

        if self.files.is_empty() && self.bucket.is_none() {
            println!("{}", "nothing to validate (pass files or --bucket)".yellow());
        }

        println!(
            "\n{} error(s), {} warning(s)",
            tally.errors, tally.warnings
        );
        if tally.errors == 0 {
            println!("{}", "✔ schedule validation passed".green().bold());
            Ok(ExitCode::SUCCESS)
        } else {
            println!("{}", "✖ schedule validation failed".red().bold());
            Ok(ExitCode::from(1))
        }
    }

    /// The remote copy is a canary: a download failure only warns.
    fn check_remote(
        &self,
        global: &GlobalArgs,
        options: ValidateOptions,
        tally: &mut Tally,
    ) -> Result<()> {
        let object = remote_object_path(self.year, self.object.as_deref());
        let (bucket, object) = match (&self.bucket, object) {
            (Some(bucket), Some(object)) => (bucket, object),
            (None, None) => return Ok(()),
            _ => {
                print_warning("remote check skipped: --bucket needs --year or --object (and vice versa)");
                tally.warnings += 1;
                return Ok(());
            }
        };

        let ctx = Context::load(global)?;
        let source = format!("gs://{bucket}/{object}");
        match ctx.storage().fetch_object(bucket, &object) {
            Ok(raw) => print_report(&validate_bytes(&source, &raw, options), tally),
            Err(err) => {
                tracing::warn!(error = %err, "remote schedule download failed");
                print_warning(&format!("{source}: download failed ({err}); skipped"));
                tally.warnings += 1;
            }
        }
        Ok(())
    }
}

fn print_report(report: &ScheduleReport, tally: &mut Tally) {
    for finding in &report.findings {
        print_finding(finding);
    }
    tally.errors += report.error_count();
    tally.warnings += report.warning_count();
    if report.passed() {
        println!(
            "{} {} ({} day(s), {} blank iqamah)",
            "✔".green().bold(),
            report.source,
            report.days,
            report.blank_iqamah
        );
    }
}

fn print_finding(finding: &Finding) {
    match finding.severity {
        Severity::Error => println!("{} {}", "✖ FAIL".red().bold(), finding.message),
        Severity::Warning => print_warning(&finding.message),
    }
}

fn print_warning(message: &str) {
    println!("{} {message}", "• WARN".yellow());
}
