//! Activity type enum as the single source of truth for category strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Loggable sustainability categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    RecycleBoxes,
    RoomTemperature,
    MilesTravelled,
    QuizCompleted,
}

/// How repeated submissions of a category are retained in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Every submission is a new event; entries accumulate.
    Cumulative,
    /// The category is a reading of current state; one entry per calendar
    /// day, later submissions overwrite it in place.
    CurrentStatePerDay,
}

impl ActivityType {
    /// All categories in declaration order.
    pub const ALL: [Self; 4] = [
        Self::RecycleBoxes,
        Self::RoomTemperature,
        Self::MilesTravelled,
        Self::QuizCompleted,
    ];

    /// Canonical name, exactly as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RecycleBoxes => "RecycleBoxes",
            Self::RoomTemperature => "RoomTemperature",
            Self::MilesTravelled => "MilesTravelled",
            Self::QuizCompleted => "QuizCompleted",
        }
    }

    /// Retention policy applied by the ledger writer.
    #[must_use]
    pub const fn retention(&self) -> RetentionPolicy {
        match self {
            Self::RoomTemperature => RetentionPolicy::CurrentStatePerDay,
            Self::RecycleBoxes | Self::MilesTravelled | Self::QuizCompleted => {
                RetentionPolicy::Cumulative
            }
        }
    }
}

/// Returns true iff `value` is exactly one of the category names.
///
/// Case-sensitive, no trimming.
pub fn is_activity_type(value: &str) -> bool {
    value.parse::<ActivityType>().is_ok()
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RecycleBoxes" => Ok(Self::RecycleBoxes),
            "RoomTemperature" => Ok(Self::RoomTemperature),
            "MilesTravelled" => Ok(Self::MilesTravelled),
            "QuizCompleted" => Ok(Self::QuizCompleted),
            _ => Err(UnknownActivityType(s.to_string())),
        }
    }
}

impl Serialize for ActivityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown activity type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivityType(String);

impl fmt::Display for UnknownActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown activity type: {}", self.0)
    }
}

impl std::error::Error for UnknownActivityType {}
