//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use clap::Args;
use regex::Regex;

use eco_core::clock::date_range_in;
use eco_core::{Ledger, SystemClock, UserId};
use eco_db::Database;

use crate::Config;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Which end of a range a bound is for.
///
/// A bare date covers the whole local day, so it resolves to that day's
/// first instant as a start and to its last instant as an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Parse a datetime string as RFC 3339, a local date or relative time.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Date: "2026-01-15" (local day)
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_bound(s: &str, edge: Edge) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let (start, end) = date_range_in(&Local, date, date);
        return Ok(match edge {
            Edge::Start => start,
            Edge::End => end,
        });
    }

    parse_relative(s, Utc::now())
}

fn parse_relative(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z), a date (e.g., 2026-01-15) or relative (e.g., '2 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Calendar period used when no explicit range is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Day,
    LastDay,
    Week,
    LastWeek,
}

/// Inclusive local-day bounds of a period relative to `today`.
///
/// Weeks run Monday through Sunday.
pub fn period_bounds(period: Period, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let (first, last) = match period {
        Period::Day => (today, today),
        Period::LastDay => {
            let yesterday = today - Duration::days(1);
            (yesterday, yesterday)
        }
        Period::Week => (monday, monday + Duration::days(6)),
        Period::LastWeek => (monday - Duration::days(7), monday - Duration::days(1)),
    };
    date_range_in(&Local, first, last)
}

/// Date range selection shared by `score` and `leaderboard`.
///
/// Without any flag the range is today.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// Range start: RFC 3339, a date (YYYY-MM-DD) or relative ("2 days ago").
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Range end, inclusive. Accepts the same forms as --from.
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Today.
    #[arg(long, conflicts_with_all = ["from", "last_day", "week", "last_week"])]
    pub day: bool,

    /// Yesterday.
    #[arg(long, conflicts_with_all = ["from", "week", "last_week"])]
    pub last_day: bool,

    /// This week, Monday through Sunday.
    #[arg(long, conflicts_with_all = ["from", "last_week"])]
    pub week: bool,

    /// Last week, Monday through Sunday.
    #[arg(long, conflicts_with = "from")]
    pub last_week: bool,
}

impl RangeArgs {
    /// The period selected by flags.
    pub const fn period(&self) -> Period {
        if self.last_week {
            Period::LastWeek
        } else if self.week {
            Period::Week
        } else if self.last_day {
            Period::LastDay
        } else {
            Period::Day
        }
    }

    /// Resolves to inclusive UTC bounds.
    pub fn resolve(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let (from, to) = match (&self.from, &self.to) {
            (Some(from), Some(to)) => (parse_bound(from, Edge::Start)?, parse_bound(to, Edge::End)?),
            (None, None) => period_bounds(self.period(), Local::now().date_naive()),
            _ => bail!("--from and --to must be given together"),
        };
        if from > to {
            bail!("range start {from} is after range end {to}");
        }
        Ok((from, to))
    }
}

/// Formats range bounds in local time for headers.
pub fn describe_range(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let fmt = "%Y-%m-%d %H:%M";
    format!(
        "{} to {}",
        from.with_timezone(&Local).format(fmt),
        to.with_timezone(&Local).format(fmt)
    )
}

/// Opens the configured database, creating its directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Opens a ledger over the configured database using the system clock.
pub fn open_ledger(config: &Config) -> Result<Ledger<Database, SystemClock>> {
    Ok(Ledger::new(open_database(config)?, SystemClock))
}

/// Resolves a username, falling back to treating the input as a user ID.
pub fn resolve_user(db: &Database, user: &str) -> Result<UserId> {
    if let Some(id) = db.find_user_id_by_username(user)? {
        return Ok(id);
    }
    UserId::new(user).context("invalid user")
}

/// Formats a score with at most two decimals and no trailing zeros.
pub fn format_score(score: f64) -> String {
    let rounded = (score * 100.0).round() / 100.0;
    // Adding zero turns -0.0 into 0.0 so it prints as "0".
    (rounded + 0.0).to_string()
}
