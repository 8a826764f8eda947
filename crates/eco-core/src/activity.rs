//! Logged activity entries and the filter used to read them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity_type::ActivityType;
use crate::types::EntryId;

/// One logged occurrence (or current-state reading) of a sustainability action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Identity of the entry within its user's ledger.
    pub id: EntryId,
    /// The category logged.
    pub category: ActivityType,
    /// Non-negative magnitude; unit implied by the category.
    pub value: f64,
    /// When the entry was recorded (or last overwritten).
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Creates an entry with a freshly generated ID.
    pub fn new(category: ActivityType, value: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::generate(),
            category,
            value,
            recorded_at,
        }
    }
}

/// Optional inclusive bounds applied when reading entries.
///
/// A `None` bound imposes no constraint. `Some(0.0)` is a real bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_to: Option<f64>,
}

impl ActivityFilter {
    /// A filter restricted to an inclusive date range.
    #[must_use]
    pub const fn between(date_from: DateTime<Utc>, date_to: DateTime<Utc>) -> Self {
        Self {
            date_from: Some(date_from),
            date_to: Some(date_to),
            unit_from: None,
            unit_to: None,
        }
    }

    /// Returns true if the entry satisfies every bound that is present.
    pub fn matches(&self, entry: &ActivityEntry) -> bool {
        self.date_from.is_none_or(|from| entry.recorded_at >= from)
            && self.date_to.is_none_or(|to| entry.recorded_at <= to)
            && self.unit_from.is_none_or(|from| entry.value >= from)
            && self.unit_to.is_none_or(|to| entry.value <= to)
    }
}
