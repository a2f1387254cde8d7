//! Timezone-localized published-at stamps.
//!
//! Format: `YYYY-MM-DDTHH:MM:SS±HH:MM`, the current instant as wall-clock time
//! in an IANA zone with that zone's offset at that instant. Every failure
//! path falls back to UTC ISO-8601 (`2026-01-15T20:35:59.000Z`); stamping
//! never errors.

use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

/// `date +%z` prints `-0600`; the stamp format wants `-06:00`.
static SHELL_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})([+-]\d{2})(\d{2})$").unwrap()
});

/// Where stamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StampSource {
    /// Bundled zone database (`chrono-tz`).
    #[default]
    Builtin,
    /// `TZ=<zone> date +%Y-%m-%dT%H:%M:%S%z`, for hosts whose zoneinfo is
    /// newer than the bundled one.
    Shell,
}

/// Produces stamps for one configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamper {
    timezone: String,
    source: StampSource,
}

impl Stamper {
    pub fn new(timezone: impl Into<String>, source: StampSource) -> Self {
        Self {
            timezone: timezone.into(),
            source,
        }
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Stamp for the current instant.
    pub fn now(&self) -> String {
        match self.source {
            StampSource::Builtin => compute_local_stamp(&self.timezone),
            StampSource::Shell => shell_stamp(&self.timezone),
        }
    }
}

/// Current instant in `timezone`, or UTC ISO-8601 when the zone is unknown.
pub fn compute_local_stamp(timezone: &str) -> String {
    local_stamp_at(timezone, Utc::now())
}

/// [`compute_local_stamp`] for a fixed instant.
pub fn local_stamp_at(timezone: &str, instant: DateTime<Utc>) -> String {
    match timezone.parse::<Tz>() {
        Ok(tz) => instant
            .with_timezone(&tz)
            .format("%Y-%m-%dT%H:%M:%S%:z")
            .to_string(),
        Err(_) => {
            tracing::warn!("unknown timezone '{timezone}'; stamping in UTC");
            utc_iso(instant)
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn utc_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stamp via the host `date` binary with `TZ` set.
pub fn shell_stamp(timezone: &str) -> String {
    let output = Command::new("date")
        .arg("+%Y-%m-%dT%H:%M:%S%z")
        .env("TZ", timezone)
        .output();
    let raw = match output {
        Ok(out) if out.status.success() => {
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        }
        Ok(out) => {
            tracing::warn!("`date` exited with {}; stamping in UTC", out.status);
            return utc_iso(Utc::now());
        }
        Err(err) => {
            tracing::warn!("cannot run `date`: {err}; stamping in UTC");
            return utc_iso(Utc::now());
        }
    };
    normalize_shell_offset(&raw).unwrap_or_else(|| {
        tracing::warn!("unexpected `date` output '{raw}'; stamping in UTC");
        utc_iso(Utc::now())
    })
}

/// `2026-01-15T14:35:59-0600` → `2026-01-15T14:35:59-06:00`.
pub fn normalize_shell_offset(raw: &str) -> Option<String> {
    let caps = SHELL_OFFSET.captures(raw)?;
    Some(format!("{}{}:{}", &caps[1], &caps[2], &caps[3]))
}

/// Fingerprint tag written by clear (and synthesized by prune):
/// `clear-` followed by the stamp with everything except digits, `T`, `:`
/// and `-` removed.
pub fn clear_tag(stamp: &str) -> String {
    let kept: String = stamp
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(*c, 'T' | ':' | '-'))
        .collect();
    format!("clear-{kept}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn chicago_winter_is_minus_six() {
        let stamp = local_stamp_at("America/Chicago", instant(2026, 1, 15, 20));
        assert_eq!(stamp, "2026-01-15T14:00:00-06:00");
    }

    #[test]
    fn chicago_summer_is_minus_five() {
        let stamp = local_stamp_at("America/Chicago", instant(2026, 7, 1, 12));
        assert_eq!(stamp, "2026-07-01T07:00:00-05:00");
    }

    #[test]
    fn half_hour_offsets_keep_minutes() {
        let stamp = local_stamp_at("Asia/Kolkata", instant(2026, 1, 1, 0));
        assert_eq!(stamp, "2026-01-01T05:30:00+05:30");
    }

    #[test]
    fn unknown_zone_falls_back_to_utc_iso() {
        let stamp = local_stamp_at("Mars/Olympus_Mons", instant(2026, 1, 15, 20));
        assert_eq!(stamp, "2026-01-15T20:00:00.000Z");
        assert!(DateTime::parse_from_rfc3339(&compute_local_stamp("Not/AZone")).is_ok());
    }

    #[test]
    fn shell_offset_gets_a_colon() {
        assert_eq!(
            normalize_shell_offset("2026-01-15T14:35:59-0600").as_deref(),
            Some("2026-01-15T14:35:59-06:00")
        );
        assert_eq!(normalize_shell_offset("Thu Jan 15 2026"), None);
    }

    #[test]
    fn shell_stamp_never_panics_and_is_rfc3339() {
        let stamp = shell_stamp("America/Chicago");
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok(), "got {stamp}");
    }

    #[test]
    fn clear_tag_strips_everything_but_digits_t_colon_dash() {
        assert_eq!(
            clear_tag("2026-01-15T14:35:59-06:00"),
            "clear-2026-01-15T14:35:59-06:00"
        );
        assert_eq!(
            clear_tag("2026-01-15T20:00:00.000Z"),
            "clear-2026-01-15T20:00:00000"
        );
        assert_eq!(
            clear_tag("2026-01-01T05:30:00+05:30"),
            "clear-2026-01-01T05:30:0005:30"
        );
    }
}
