//! The activity ledger: writing, reading and summing per-user entries.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::activity::{ActivityEntry, ActivityFilter};
use crate::activity_type::{ActivityType, RetentionPolicy};
use crate::clock::Clock;
use crate::store::{RecordStore, StoreError};
use crate::types::{EntryId, UserId};
use crate::user::User;

/// Errors returned by ledger, scoring and leaderboard operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced user ID does not resolve.
    #[error("User not found")]
    UserNotFound { user_id: UserId },

    /// The record store failed; `message` already embeds the cause.
    #[error("{message}")]
    Store {
        message: String,
        #[source]
        source: StoreError,
    },

    /// Today's entry was found by date but could not be re-located by ID.
    #[error("Activity could not be logged for user {user_id}, entry {entry_id} is no longer present")]
    InconsistentState { user_id: UserId, entry_id: EntryId },
}

impl LedgerError {
    fn store(context: impl fmt::Display, source: StoreError) -> Self {
        Self::Store {
            message: format!("{context}, {source}"),
            source,
        }
    }
}

/// What the writer did with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    /// A new entry was appended.
    Appended,
    /// Today's current-state entry was overwritten in place.
    Updated,
}

/// Result of a successful [`Ledger::log_activity`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogOutcome {
    pub action: LogAction,
    pub user_id: UserId,
    pub entry: ActivityEntry,
}

impl fmt::Display for LogOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            LogAction::Appended => write!(f, "Logged activity for user {}", self.user_id),
            LogAction::Updated => write!(f, "Updated today's {}", describe(self.entry.category)),
        }
    }
}

const fn describe(category: ActivityType) -> &'static str {
    match category {
        ActivityType::RoomTemperature => "temperature",
        ActivityType::RecycleBoxes => "recycling",
        ActivityType::MilesTravelled => "miles travelled",
        ActivityType::QuizCompleted => "quiz result",
    }
}

/// Activity ledger over a record store and a clock.
///
/// Writes take `&mut self`, which serializes each read-modify-write against
/// the store. Share across threads behind a `Mutex`.
#[derive(Debug)]
pub struct Ledger<S, C> {
    store: S,
    clock: C,
}

impl<S: RecordStore, C: Clock> Ledger<S, C> {
    pub const fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn into_parts(self) -> (S, C) {
        (self.store, self.clock)
    }

    /// Appends an entry, or overwrites today's entry for current-state categories.
    ///
    /// The value's sign is not checked here; callers validate input first.
    pub fn log_activity(
        &mut self,
        user_id: &UserId,
        category: ActivityType,
        value: f64,
    ) -> Result<LogOutcome, LedgerError> {
        let context = || format!("Activity could not be logged for user {user_id}");
        let mut user = self
            .store
            .find_user_by_id(user_id)
            .map_err(|err| LedgerError::store(context(), err))?
            .ok_or_else(|| LedgerError::UserNotFound {
                user_id: user_id.clone(),
            })?;

        let now = self.clock.now();
        let (action, entry) = match category.retention() {
            RetentionPolicy::Cumulative => append(&mut user, category, value, now),
            RetentionPolicy::CurrentStatePerDay => {
                let (today_from, today_to) = self.clock.day_bounds(now);
                let today = self.get_activities(
                    user_id,
                    category,
                    &ActivityFilter::between(today_from, today_to),
                )?;
                match today.first() {
                    Some(existing) => {
                        let Some(index) = user.position_of(&existing.id) else {
                            tracing::error!(
                                user_id = %user_id,
                                entry_id = %existing.id,
                                "today's entry vanished between read and update"
                            );
                            return Err(LedgerError::InconsistentState {
                                user_id: user_id.clone(),
                                entry_id: existing.id.clone(),
                            });
                        };
                        let entry = &mut user.activities[index];
                        entry.category = category;
                        entry.value = value;
                        entry.recorded_at = now;
                        (LogAction::Updated, entry.clone())
                    }
                    None => append(&mut user, category, value, now),
                }
            }
        };

        user.updated_at = now;
        self.store
            .save(&user)
            .map_err(|err| LedgerError::store(context(), err))?;

        tracing::debug!(
            user_id = %user_id,
            category = %category,
            value,
            action = ?action,
            "logged activity"
        );
        Ok(LogOutcome {
            action,
            user_id: user_id.clone(),
            entry,
        })
    }

    /// Returns the user's entries of one category that pass every present bound.
    ///
    /// Entries keep the store's order.
    pub fn get_activities(
        &self,
        user_id: &UserId,
        category: ActivityType,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityEntry>, LedgerError> {
        let user = self.load_user(user_id, || {
            format!("Could not obtain activities for user {user_id}")
        })?;
        Ok(user
            .activities
            .into_iter()
            .filter(|entry| entry.category == category && filter.matches(entry))
            .collect())
    }

    /// Sums the values of one category within an inclusive date range.
    pub fn sum_category(
        &self,
        user_id: &UserId,
        category: ActivityType,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<f64, LedgerError> {
        let entries =
            self.get_activities(user_id, category, &ActivityFilter::between(date_from, date_to))?;
        Ok(entries.iter().map(|entry| entry.value).sum())
    }

    fn load_user<F>(&self, user_id: &UserId, context: F) -> Result<User, LedgerError>
    where
        F: FnOnce() -> String,
    {
        self.store
            .find_user_by_id(user_id)
            .map_err(|err| LedgerError::store(context(), err))?
            .ok_or_else(|| LedgerError::UserNotFound {
                user_id: user_id.clone(),
            })
    }
}

fn append(
    user: &mut User,
    category: ActivityType,
    value: f64,
    now: DateTime<Utc>,
) -> (LogAction, ActivityEntry) {
    let entry = ActivityEntry::new(category, value, now);
    user.activities.push(entry.clone());
    (LogAction::Appended, entry)
}
