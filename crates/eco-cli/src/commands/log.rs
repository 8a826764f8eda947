//! Logging an activity for a user.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;

use eco_core::types::{celsius_to_fahrenheit, validate_value};
use eco_core::{ActivityType, LogOutcome, is_activity_type};

use super::util::{open_ledger, resolve_user};
use crate::Config;

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Username or user ID.
    pub user: String,

    /// Activity category, case-sensitive: RecycleBoxes, RoomTemperature,
    /// MilesTravelled or QuizCompleted.
    pub category: String,

    /// Amount in the category's unit. Room temperature is in Fahrenheit.
    #[arg(allow_negative_numbers = true)]
    pub value: f64,

    /// Interpret a room temperature in Celsius.
    #[arg(long)]
    pub celsius: bool,
}

impl LogArgs {
    /// Validates the request and converts it to ledger input.
    fn validated(&self) -> Result<(ActivityType, f64)> {
        if !is_activity_type(&self.category) {
            bail!("Invalid activity type: {}", self.category);
        }
        let category: ActivityType = self.category.parse()?;

        let mut value = self.value;
        if self.celsius {
            if category != ActivityType::RoomTemperature {
                bail!("--celsius only applies to {}", ActivityType::RoomTemperature);
            }
            value = celsius_to_fahrenheit(value);
        }

        let value = validate_value(value).context("You must specify the units")?;
        Ok((category, value))
    }
}

pub fn run<W: Write>(writer: &mut W, args: &LogArgs, config: &Config) -> Result<LogOutcome> {
    let (category, value) = args.validated()?;

    let mut ledger = open_ledger(config)?;
    let user_id = resolve_user(ledger.store(), &args.user)?;
    let outcome = ledger.log_activity(&user_id, category, value)?;

    writeln!(writer, "{outcome}")?;
    Ok(outcome)
}
