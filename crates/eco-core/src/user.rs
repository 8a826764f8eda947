//! Users and the activity ledger they own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityEntry;
use crate::types::{EntryId, UserId};

/// A registered user together with their logged activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Display name on the leaderboard. Users without one are not ranked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Entries in insertion order.
    #[serde(default)]
    pub activities: Vec<ActivityEntry>,
}

impl User {
    /// Creates a user with no activities.
    pub fn new(id: UserId, username: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            email: None,
            name: None,
            created_at: now,
            updated_at: now,
            activities: Vec::new(),
        }
    }

    /// Finds the position of an entry by identity.
    pub fn position_of(&self, entry_id: &EntryId) -> Option<usize> {
        self.activities.iter().position(|entry| &entry.id == entry_id)
    }
}

/// Registration details for a user that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}
