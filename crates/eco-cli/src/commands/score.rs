//! A single user's score over a period.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use eco_core::ScoreBreakdown;

use super::util::{RangeArgs, describe_range, format_score, open_ledger, resolve_user};
use crate::Config;

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Username or user ID.
    pub user: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonScore<'a> {
    user: &'a str,
    from: String,
    to: String,
    #[serde(flatten)]
    breakdown: ScoreBreakdown,
}

pub fn run<W: Write>(writer: &mut W, args: &ScoreArgs, config: &Config) -> Result<ScoreBreakdown> {
    let (from, to) = args.range.resolve()?;
    let ledger = open_ledger(config)?;
    let user_id = resolve_user(ledger.store(), &args.user)?;
    let breakdown = ledger.score_breakdown(&user_id, from, to)?;

    if args.json {
        let json = JsonScore {
            user: &args.user,
            from: from.to_rfc3339(),
            to: to.to_rfc3339(),
            breakdown,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&json)?)?;
    } else {
        writeln!(writer, "Score for {} ({})", args.user, describe_range(from, to))?;
        writeln!(writer)?;
        write_breakdown(writer, &breakdown)?;
    }
    Ok(breakdown)
}

fn write_breakdown<W: Write>(writer: &mut W, breakdown: &ScoreBreakdown) -> Result<()> {
    let rows = [
        ("Recycled boxes", format_score(breakdown.recycling)),
        (
            "Room temperature",
            format!(
                "{} (logged {})",
                format_score(breakdown.temperature_score),
                format_score(breakdown.room_temperature)
            ),
        ),
        ("Miles travelled", format_score(breakdown.miles_travelled)),
        ("Quiz points", format_score(breakdown.quiz_completed)),
    ];
    for (label, value) in rows {
        writeln!(writer, "  {label:<18} {value}")?;
    }
    writeln!(writer, "  {:<18} {}", "Total", format_score(breakdown.total))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use eco_core::{ActivityEntry, ActivityType, User, UserId};
    use eco_db::Database;
    use insta::assert_snapshot;

    fn setup() -> (tempfile::TempDir, Config) {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("eco.db"),
            ..Config::default()
        };

        let at = |day| Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap();
        let mut user = User::new(UserId::new("u-alice").unwrap(), Some("alice".into()), at(1));
        user.activities = vec![
            ActivityEntry::new(ActivityType::RecycleBoxes, 5.0, at(2)),
            ActivityEntry::new(ActivityType::MilesTravelled, 3.0, at(2)),
            ActivityEntry::new(ActivityType::RoomTemperature, 70.0, at(2)),
            ActivityEntry::new(ActivityType::QuizCompleted, 20.0, at(2)),
            ActivityEntry::new(ActivityType::RecycleBoxes, 100.0, at(20)),
        ];
        Database::open(&config.database_path)
            .unwrap()
            .put_user(&user)
            .unwrap();
        (temp, config)
    }

    fn args(from: &str, to: &str, json: bool) -> ScoreArgs {
        ScoreArgs {
            user: "alice".to_string(),
            range: RangeArgs {
                from: Some(from.to_string()),
                to: Some(to.to_string()),
                ..RangeArgs::default()
            },
            json,
        }
    }

    #[test]
    fn score_sums_categories_with_comfort_band() {
        let (_temp, config) = setup();
        let mut output = Vec::new();

        let breakdown = run(
            &mut output,
            &args("2025-06-01T00:00:00Z", "2025-06-03T00:00:00Z", false),
            &config,
        )
        .unwrap();

        // 5 boxes + 70F (70 points) + 3 miles + 20 quiz points
        assert!((breakdown.total - 98.0).abs() < f64::EPSILON);
        let output = String::from_utf8(output).unwrap();
        let body: String = output.lines().skip(2).map(|line| format!("{}\n", line.trim_start())).collect();
        assert_snapshot!(body, @r"
        Recycled boxes     5
        Room temperature   70 (logged 70)
        Miles travelled    3
        Quiz points        20
        Total              98
        ");
    }

    #[test]
    fn score_json_includes_bounds() {
        let (_temp, config) = setup();
        let mut output = Vec::new();
        run(
            &mut output,
            &args("2025-06-15T00:00:00Z", "2025-06-30T00:00:00Z", true),
            &config,
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["user"], "alice");
        assert_eq!(json["from"], "2025-06-15T00:00:00+00:00");
        assert_eq!(json["recycling"], 100.0);
        assert_eq!(json["temperature_score"], 0.0);
        assert_eq!(json["total"], 100.0);
    }

    #[test]
    fn empty_range_scores_zero() {
        let (_temp, config) = setup();
        let breakdown = run(
            &mut Vec::new(),
            &args("2024-01-01T00:00:00Z", "2024-01-31T00:00:00Z", false),
            &config,
        )
        .unwrap();
        assert_eq!(breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn unknown_user_fails() {
        let (_temp, config) = setup();
        let mut request = args("2025-06-01", "2025-06-30", false);
        request.user = "nobody".to_string();
        let err = run(&mut Vec::new(), &request, &config).unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }
}
