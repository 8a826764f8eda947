//! Ranking every named user by score over a shared date range.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::Clock;
use crate::ledger::{Ledger, LedgerError};
use crate::store::RecordStore;

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: f64,
    /// 1-based position after sorting; tied scores still get distinct ranks.
    pub rank: usize,
}

/// Sorts by score descending and assigns sequential ranks.
///
/// The sort is stable, so tied scores keep their input order and receive
/// consecutive ranks (50, 50, 30 rank as 1, 2, 3).
pub fn rank_scores(mut scores: Vec<(String, f64)>) -> Vec<LeaderboardEntry> {
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    scores
        .into_iter()
        .enumerate()
        .map(|(index, (username, score))| LeaderboardEntry {
            username,
            score,
            rank: index + 1,
        })
        .collect()
}

impl<S: RecordStore, C: Clock> Ledger<S, C> {
    /// Scores every user with a username and ranks them.
    ///
    /// Any single user's failure aborts the whole build; no partial
    /// leaderboard is returned.
    pub fn build_leaderboard(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        let users = self
            .store()
            .list_users()
            .map_err(|source| LedgerError::Store {
                message: format!("Unable to get leaderboard, {source}"),
                source,
            })?;

        let mut scores = Vec::with_capacity(users.len());
        for user in users {
            let Some(username) = user.username else {
                tracing::debug!(user_id = %user.id, "skipping user without username");
                continue;
            };
            let score = self
                .compute_score(&user.id, date_from, date_to)
                .inspect_err(|err| {
                    tracing::warn!(user_id = %user.id, error = %err, "leaderboard build aborted");
                })?;
            scores.push((username, score));
        }

        Ok(rank_scores(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::activity_type::ActivityType;
    use crate::clock::FixedClock;
    use crate::ledger::tests::{at, ledger_at, register};
    use crate::store::{MemoryStore, StoreError};
    use crate::types::UserId;
    use crate::user::{NewUser, User};

    #[test]
    fn tied_scores_get_consecutive_ranks() {
        let ranked = rank_scores(vec![
            ("carol".to_string(), 30.0),
            ("alice".to_string(), 50.0),
            ("bob".to_string(), 50.0),
        ]);
        let rows: Vec<_> = ranked
            .iter()
            .map(|entry| (entry.username.as_str(), entry.rank))
            .collect();
        assert_eq!(rows, vec![("alice", 1), ("bob", 2), ("carol", 3)]);
    }

    #[test]
    fn empty_input_ranks_nothing() {
        assert!(rank_scores(Vec::new()).is_empty());
    }

    #[test]
    fn leaderboard_ranks_named_users_by_score() {
        let mut ledger = ledger_at("2025-06-02T12:00:00Z");
        let alice = register(&mut ledger, "alice");
        let bob = register(&mut ledger, "bob");
        let carol = register(&mut ledger, "carol");
        let anonymous = ledger
            .store_mut()
            .create_user(NewUser::default())
            .unwrap()
            .id;

        // alice: 50, bob: 50, carol: 30 (no temperature logged, so no band points).
        ledger
            .log_activity(&alice, ActivityType::RecycleBoxes, 50.0)
            .unwrap();
        ledger
            .log_activity(&bob, ActivityType::MilesTravelled, 20.0)
            .unwrap();
        ledger
            .log_activity(&bob, ActivityType::QuizCompleted, 30.0)
            .unwrap();
        ledger
            .log_activity(&carol, ActivityType::MilesTravelled, 30.0)
            .unwrap();
        ledger
            .log_activity(&anonymous, ActivityType::RecycleBoxes, 999.0)
            .unwrap();

        let board = ledger
            .build_leaderboard(at("2025-06-02T00:00:00Z"), at("2025-06-02T23:59:59.999Z"))
            .unwrap();
        assert_eq!(
            board,
            vec![
                LeaderboardEntry {
                    username: "alice".to_string(),
                    score: 50.0,
                    rank: 1,
                },
                LeaderboardEntry {
                    username: "bob".to_string(),
                    score: 50.0,
                    rank: 2,
                },
                LeaderboardEntry {
                    username: "carol".to_string(),
                    score: 30.0,
                    rank: 3,
                },
            ]
        );
    }

    #[test]
    fn leaderboard_of_empty_store_is_empty() {
        let ledger = ledger_at("2025-06-02T12:00:00Z");
        let board = ledger
            .build_leaderboard(at("2025-06-01T00:00:00Z"), at("2025-06-30T00:00:00Z"))
            .unwrap();
        assert!(board.is_empty());
    }

    /// Lists a user that cannot be loaded, as if removed mid-build.
    struct DanglingUserStore {
        inner: MemoryStore,
        ghost: User,
    }

    impl RecordStore for DanglingUserStore {
        fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
            if id == &self.ghost.id {
                return Err(StoreError::new("record is corrupt"));
            }
            self.inner.find_user_by_id(id)
        }

        fn save(&mut self, user: &User) -> Result<(), StoreError> {
            self.inner.save(user)
        }

        fn list_users(&self) -> Result<Vec<User>, StoreError> {
            let mut users = self.inner.list_users()?;
            users.push(self.ghost.clone());
            Ok(users)
        }

        fn create_user(&mut self, new_user: NewUser) -> Result<User, StoreError> {
            self.inner.create_user(new_user)
        }
    }

    #[test]
    fn one_failing_user_fails_the_whole_build() {
        let mut inner = MemoryStore::new();
        inner
            .create_user(NewUser {
                username: Some("alice".to_string()),
                ..NewUser::default()
            })
            .unwrap();
        let ghost = User::new(
            UserId::new("ghost").unwrap(),
            Some("ghost".to_string()),
            at("2025-06-01T00:00:00Z"),
        );
        let ledger = Ledger::new(
            DanglingUserStore { inner, ghost },
            FixedClock::utc(at("2025-06-02T12:00:00Z")),
        );

        let err = ledger
            .build_leaderboard(at("2025-06-01T00:00:00Z"), at("2025-06-30T00:00:00Z"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not obtain activities for user ghost, record is corrupt"
        );
    }

    struct UnlistableStore;

    impl RecordStore for UnlistableStore {
        fn find_user_by_id(&self, _id: &UserId) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        fn save(&mut self, _user: &User) -> Result<(), StoreError> {
            Ok(())
        }

        fn list_users(&self) -> Result<Vec<User>, StoreError> {
            Err(StoreError::new("timed out"))
        }

        fn create_user(&mut self, _new_user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::new("read-only"))
        }
    }

    #[test]
    fn listing_failure_is_wrapped() {
        let ledger = Ledger::new(UnlistableStore, FixedClock::utc(at("2025-06-02T12:00:00Z")));
        let err = ledger
            .build_leaderboard(at("2025-06-01T00:00:00Z"), at("2025-06-30T00:00:00Z"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to get leaderboard, timed out");
    }
}
