//! Core domain logic for the sustainability activity ledger.
//!
//! This crate contains:
//! - The closed set of activity categories and their retention policies
//! - The ledger: writing entries (with the day-scoped temperature overwrite),
//!   filtered reads and per-category sums
//! - Scoring with the temperature comfort band
//! - Leaderboard ranking across all users
//! - The `RecordStore` seam plus an in-memory implementation

pub mod activity;
pub mod activity_type;
pub mod clock;
mod leaderboard;
mod ledger;
pub mod quiz;
mod scoring;
pub mod store;
pub mod types;
pub mod user;

pub use activity::{ActivityEntry, ActivityFilter};
pub use activity_type::{ActivityType, RetentionPolicy, UnknownActivityType, is_activity_type};
pub use clock::{Clock, FixedClock, SystemClock};
pub use leaderboard::{LeaderboardEntry, rank_scores};
pub use ledger::{Ledger, LedgerError, LogAction, LogOutcome};
pub use quiz::{Quiz, QuizQuestion, points_earned};
pub use scoring::{COMFORT_PEAK_POINTS, COMFORT_SETPOINT_F, ScoreBreakdown, comfort_band_score};
pub use store::{MemoryStore, RecordStore, StoreError};
pub use types::{EntryId, UserId, ValidationError};
pub use user::{NewUser, User};
