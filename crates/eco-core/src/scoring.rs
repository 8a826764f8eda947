//! Per-user score over a date range.
//!
//! Recycling, miles and quiz points pass through linearly. Room temperature
//! is scored on a comfort band: the reward peaks when the summed reading sits
//! on [`COMFORT_SETPOINT_F`] and falls off linearly on either side, floored
//! at zero so an extreme reading never subtracts from other categories.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::activity_type::ActivityType;
use crate::clock::Clock;
use crate::ledger::{Ledger, LedgerError};
use crate::store::RecordStore;
use crate::types::UserId;

/// Comfort setpoint in degrees Fahrenheit.
pub const COMFORT_SETPOINT_F: f64 = 72.0;

/// Points awarded when the temperature sits exactly on the setpoint.
pub const COMFORT_PEAK_POINTS: f64 = 72.0;

/// Triangular comfort-band reward for a summed temperature reading.
pub fn comfort_band_score(room_temperature: f64) -> f64 {
    (COMFORT_PEAK_POINTS - (room_temperature - COMFORT_SETPOINT_F).abs()).max(0.0)
}

/// Category totals and the score they combine into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub recycling: f64,
    pub room_temperature: f64,
    pub miles_travelled: f64,
    pub quiz_completed: f64,
    /// Comfort-band points derived from `room_temperature`.
    pub temperature_score: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    /// Combines raw category totals.
    pub fn from_totals(
        recycling: f64,
        room_temperature: f64,
        miles_travelled: f64,
        quiz_completed: f64,
    ) -> Self {
        let temperature_score = comfort_band_score(room_temperature);
        Self {
            recycling,
            room_temperature,
            miles_travelled,
            quiz_completed,
            temperature_score,
            total: recycling + temperature_score + miles_travelled + quiz_completed,
        }
    }
}

impl<S: RecordStore, C: Clock> Ledger<S, C> {
    /// Score for one user over an inclusive date range.
    pub fn compute_score(
        &self,
        user_id: &UserId,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<f64, LedgerError> {
        Ok(self.score_breakdown(user_id, date_from, date_to)?.total)
    }

    /// Category totals behind [`Ledger::compute_score`].
    ///
    /// Stops at the first category whose sum fails.
    pub fn score_breakdown(
        &self,
        user_id: &UserId,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<ScoreBreakdown, LedgerError> {
        let sum = |category| self.sum_category(user_id, category, date_from, date_to);

        let recycling = sum(ActivityType::RecycleBoxes)?;
        let room_temperature = sum(ActivityType::RoomTemperature)?;
        let miles_travelled = sum(ActivityType::MilesTravelled)?;
        let quiz_completed = sum(ActivityType::QuizCompleted)?;

        Ok(ScoreBreakdown::from_totals(
            recycling,
            room_temperature,
            miles_travelled,
            quiz_completed,
        ))
    }
}
