//! Prayer schedule validation for `herald-schedule`.
//!
//! A schedule is a JSON array of days:
//!
//! ```json
//! [{"date": "2026-01-01",
//!   "prayers": {"fajr": {"begin": "06:22", "iqamah": "06:45"}, ...}}]
//! ```
//!
//! [`validate_str`] checks structure, strict `HH:mm` times, plausible begin
//! windows per prayer, iqamah ordering and delay, and rough full-year span.
//! Problems are collected as [`Finding`]s; a report passes when it has no
//! errors. Warnings never fail a report.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Prayers every day must carry, in report order.
pub const PRAYERS: [&str; 5] = ["fajr", "dhuhr", "asr", "maghrib", "isha"];

static STRICT_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").unwrap());

/// Plausible begin-time window, minutes after midnight, inclusive.
pub fn begin_window(prayer: &str) -> Option<(u32, u32)> {
    match prayer {
        "fajr" => Some((4 * 60, 8 * 60 + 10)),
        "dhuhr" => Some((11 * 60, 14 * 60 + 30)),
        "asr" => Some((14 * 60, 19 * 60)),
        "maghrib" => Some((16 * 60, 22 * 60)),
        "isha" => Some((18 * 60, 24 * 60 - 1)),
        _ => None,
    }
}

/// Longest usual gap from begin (adhan) to iqamah, minutes.
pub fn max_iqamah_delay(prayer: &str) -> Option<u32> {
    match prayer {
        "fajr" | "dhuhr" => Some(120),
        "asr" => Some(150),
        "maghrib" => Some(45),
        "isha" => Some(180),
        _ => None,
    }
}

pub fn is_strict_time(hhmm: &str) -> bool {
    STRICT_TIME.is_match(hhmm)
}

/// Minutes after midnight for a strict `HH:mm` value.
fn to_minutes(hhmm: &str) -> Option<u32> {
    let (h, m) = hhmm.split_once(':')?;
    Some(h.parse::<u32>().ok()? * 60 + m.parse::<u32>().ok()?)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Knobs for [`validate_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Empty iqamah is an error rather than a warning.
    pub empty_iqamah_is_error: bool,
    /// Warn on mixed years and on schedules not spanning January–December.
    pub expect_full_year: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            empty_iqamah_is_error: false,
            expect_full_year: true,
        }
    }
}

/// Findings for one schedule document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReport {
    /// Where the document came from, used as the message prefix.
    pub source: String,
    pub findings: Vec<Finding>,
    /// Days with a parseable date.
    pub days: usize,
    /// Empty iqamah values seen.
    pub blank_iqamah: usize,
}

impl ScheduleReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            findings: Vec::new(),
            days: 0,
            blank_iqamah: 0,
        }
    }

    fn error(&mut self, message: String) {
        self.findings.push(Finding {
            severity: Severity::Error,
            message: format!("{}: {message}", self.source),
        });
    }

    fn warn(&mut self, message: String) {
        self.findings.push(Finding {
            severity: Severity::Warning,
            message: format!("{}: {message}", self.source),
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("cannot read schedule {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read and validate the schedule at `path`.
pub fn validate_file(path: &Path, options: ValidateOptions) -> Result<ScheduleReport, ScheduleError> {
    let raw = std::fs::read(path).map_err(|source| ScheduleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(validate_bytes(&path.display().to_string(), &raw, options))
}

/// Validate raw bytes (e.g. a downloaded object). Invalid UTF-8 is reported
/// as invalid JSON.
pub fn validate_bytes(source: &str, raw: &[u8], options: ValidateOptions) -> ScheduleReport {
    match std::str::from_utf8(raw) {
        Ok(text) => validate_str(source, text, options),
        Err(err) => {
            let mut report = ScheduleReport::new(source);
            report.error(format!("invalid JSON: {err}"));
            report
        }
    }
}

pub fn validate_str(source: &str, raw: &str, options: ValidateOptions) -> ScheduleReport {
    let mut report = ScheduleReport::new(source);

    let data: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(err) => {
            report.error(format!("invalid JSON: {err}"));
            return report;
        }
    };
    let days = match data.as_array() {
        Some(days) if !days.is_empty() => days,
        _ => {
            report.error("expected a non-empty array of day objects".to_string());
            return report;
        }
    };

    let empty = Map::new();
    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (idx, day) in days.iter().enumerate().map(|(i, d)| (i + 1, d)) {
        let day = day.as_object().unwrap_or(&empty);
        let Some(date_text) = day.get("date").and_then(Value::as_str) else {
            report.error(format!("record #{idx} missing 'date' string"));
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date_text, "%Y-%m-%d") else {
            report.error(format!("bad 'date' at #{idx}: {date_text} (YYYY-MM-DD)"));
            continue;
        };
        if !seen.insert(date_text) {
            report.error(format!("duplicate date {date_text}"));
        }
        dates.push(date);

        let prayers = match day.get("prayers") {
            None => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => {
                report.error(format!("'prayers' must be an object for {date_text}"));
                continue;
            }
        };

        for prayer in PRAYERS {
            let entry = match prayers.get(prayer) {
                None => &empty,
                Some(Value::Object(map)) => map,
                Some(_) => {
                    report.error(format!("'prayers.{prayer}' must be an object for {date_text}"));
                    continue;
                }
            };
            check_prayer(&mut report, options, date_text, prayer, entry);
        }
    }
    report.days = dates.len();

    if let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) {
        if !dates.windows(2).all(|w| w[0] <= w[1]) {
            report.warn("dates not strictly sorted; consider sorting".to_string());
        }
        if options.expect_full_year {
            let year = first.year();
            if dates.iter().any(|d| d.year() != year) {
                report.warn(format!("mixed years detected (first year={year})"));
            }
            if first.month() > 1 || last.month() < 12 {
                report.warn(format!(
                    "does not span roughly a full year (first={first}, last={last})"
                ));
            }
        }
    }
    report
}

/// Object path for the remote canary: `--object` when given (slashes
/// normalized), else `prayer_times/<year>.json`.
pub fn remote_object_path(year: Option<i32>, object: Option<&str>) -> Option<String> {
    match (object, year) {
        (Some(obj), _) => {
            let trimmed = obj.trim_matches('/');
            let parts: Vec<&str> = trimmed.split('/').filter(|p| !p.is_empty()).collect();
            Some(parts.join("/"))
        }
        (None, Some(year)) => Some(format!("prayer_times/{year}.json")),
        (None, None) => None,
    }
}

// ---------------------------------------------------------------------------
// Per-prayer checks
// ---------------------------------------------------------------------------

fn text_field(entry: &Map<String, Value>, key: &str) -> String {
    match entry.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn check_prayer(
    report: &mut ScheduleReport,
    options: ValidateOptions,
    date: &str,
    prayer: &str,
    entry: &Map<String, Value>,
) {
    let begin = text_field(entry, "begin");
    let iqamah = text_field(entry, "iqamah");
    let begin_ok = is_strict_time(&begin);
    let iqamah_ok = is_strict_time(&iqamah);

    if !begin_ok {
        report.error(format!("{date} '{prayer}.begin' invalid or empty (HH:mm)"));
    }
    if !iqamah.is_empty() && !iqamah_ok {
        report.error(format!("{date} '{prayer}.iqamah' invalid '{iqamah}' (HH:mm)"));
    }

    for (field, value) in [("begin", &begin), ("iqamah", &iqamah)] {
        if value == "00:00" || value == "24:00" {
            report.error(format!("{date} '{prayer}.{field}'={value} not plausible"));
        }
    }

    if begin == "12:00" && prayer != "dhuhr" {
        report.warn(format!("{date} '{prayer}.begin' = 12:00 looks suspicious"));
    }

    let begin_minutes = if begin_ok { to_minutes(&begin) } else { None };
    if let (Some(b), Some((lo, hi))) = (begin_minutes, begin_window(prayer)) {
        if b < lo || b > hi {
            report.error(format!(
                "{date} '{prayer}.begin'={begin} outside plausible window for {prayer}"
            ));
        }
    }

    if iqamah.is_empty() {
        report.blank_iqamah += 1;
        if options.empty_iqamah_is_error {
            report.error(format!(
                "{date} '{prayer}.iqamah' empty (blocked by --no-empty-iqamah)"
            ));
        } else {
            report.warn(format!("{date} '{prayer}.iqamah' empty (allowed; unset)"));
        }
        return;
    }

    let iqamah_minutes = if iqamah_ok { to_minutes(&iqamah) } else { None };
    if let (Some(b), Some(q)) = (begin_minutes, iqamah_minutes) {
        if q < b {
            report.error(format!(
                "{date} '{prayer}.iqamah'({iqamah}) earlier than begin({begin})"
            ));
        } else if let Some(max) = max_iqamah_delay(prayer) {
            if q - b > max {
                report.warn(format!(
                    "{date} '{prayer}.iqamah'({iqamah}) {} min after begin({begin}); exceeds typical {max} for {prayer}",
                    q - b
                ));
            }
        }
    }
}
