//! Ranking all users for a period.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use eco_core::LeaderboardEntry;

use super::util::{RangeArgs, describe_range, format_score, open_ledger};
use crate::Config;

#[derive(Debug, Args)]
pub struct LeaderboardArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Show only the top N users.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonLeaderboard<'a> {
    from: String,
    to: String,
    entries: &'a [LeaderboardEntry],
}

pub fn run<W: Write>(writer: &mut W, args: &LeaderboardArgs, config: &Config) -> Result<()> {
    let (from, to) = args.range.resolve()?;
    let ledger = open_ledger(config)?;
    let mut entries = ledger.build_leaderboard(from, to)?;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if args.json {
        let json = JsonLeaderboard {
            from: from.to_rfc3339(),
            to: to.to_rfc3339(),
            entries: &entries,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&json)?)?;
        return Ok(());
    }

    writeln!(writer, "Leaderboard ({})", describe_range(from, to))?;
    writeln!(writer)?;
    if entries.is_empty() {
        writeln!(writer, "No ranked users.")?;
        return Ok(());
    }
    for entry in &entries {
        writeln!(
            writer,
            "{:>3}. {:<16} {}",
            entry.rank,
            entry.username,
            format_score(entry.score)
        )?;
    }
    Ok(())
}
