//! Listing a user's entries of one category.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use eco_core::{ActivityFilter, ActivityType};

use super::util::{Edge, format_score, open_ledger, parse_bound, resolve_user};
use crate::Config;

#[derive(Debug, Args)]
pub struct ActivitiesArgs {
    /// Username or user ID.
    pub user: String,

    /// Activity category to list.
    pub category: ActivityType,

    /// Earliest recorded time (RFC 3339, YYYY-MM-DD or "N days ago").
    #[arg(long)]
    pub from: Option<String>,

    /// Latest recorded time, inclusive.
    #[arg(long)]
    pub to: Option<String>,

    /// Smallest value to include.
    #[arg(long)]
    pub min: Option<f64>,

    /// Largest value to include.
    #[arg(long)]
    pub max: Option<f64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ActivitiesArgs {
    fn filter(&self) -> Result<ActivityFilter> {
        Ok(ActivityFilter {
            date_from: self
                .from
                .as_deref()
                .map(|s| parse_bound(s, Edge::Start))
                .transpose()?,
            date_to: self
                .to
                .as_deref()
                .map(|s| parse_bound(s, Edge::End))
                .transpose()?,
            unit_from: self.min,
            unit_to: self.max,
        })
    }
}

pub fn run<W: Write>(writer: &mut W, args: &ActivitiesArgs, config: &Config) -> Result<()> {
    let filter = args.filter()?;
    let ledger = open_ledger(config)?;
    let user_id = resolve_user(ledger.store(), &args.user)?;
    let entries = ledger
        .get_activities(&user_id, args.category, &filter)
        .context("failed to read activities")?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(writer, "No {} entries.", args.category)?;
        return Ok(());
    }

    for entry in &entries {
        writeln!(
            writer,
            "{}  {:>8}  {}",
            entry.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            format_score(entry.value),
            entry.id
        )?;
    }
    Ok(())
}
