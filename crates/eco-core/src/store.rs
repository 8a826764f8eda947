//! The durable per-user record store the ledger reads and writes through.
//!
//! # Atomicity
//!
//! The ledger performs read-modify-write sequences on a single user (the
//! day-scoped temperature overwrite). Implementations must make [`RecordStore::save`]
//! replace the whole user record atomically; the ledger holds `&mut` access
//! to the store for the duration of each write, so in-process writes cannot
//! interleave. Stores shared between processes need their own per-user
//! locking or optimistic retry.

use std::error::Error;
use std::fmt;

use chrono::Utc;

use crate::types::UserId;
use crate::user::{NewUser, User};

/// Opaque failure raised by a store implementation.
///
/// Keeps the underlying error as its source so callers can inspect the
/// chain, while its `Display` is the underlying message only.
#[derive(Debug)]
pub struct StoreError(Box<dyn Error + Send + Sync + 'static>);

impl StoreError {
    /// Wraps any error (or message) raised by a store.
    pub fn new(err: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self(err.into())
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref())
    }
}

/// Per-user record storage.
pub trait RecordStore {
    /// Loads a user with all of their activities, or `None` if the ID is unknown.
    fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Persists the full user record, replacing what was stored.
    fn save(&mut self, user: &User) -> Result<(), StoreError>;

    /// Lists every user in the store's natural order.
    fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Registers a new user and returns it.
    fn create_user(&mut self, new_user: NewUser) -> Result<User, StoreError>;
}

/// A `RecordStore` kept entirely in memory.
///
/// Users are listed in creation order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a user record as-is.
    pub fn insert(&mut self, user: User) {
        match self.users.iter_mut().find(|existing| existing.id == user.id) {
            Some(existing) => *existing = user,
            None => self.users.push(user),
        }
    }
}

impl RecordStore for MemoryStore {
    fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.iter().find(|user| &user.id == id).cloned())
    }

    fn save(&mut self, user: &User) -> Result<(), StoreError> {
        self.insert(user.clone());
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.clone())
    }

    fn create_user(&mut self, new_user: NewUser) -> Result<User, StoreError> {
        if let Some(username) = new_user.username.as_deref() {
            if self
                .users
                .iter()
                .any(|user| user.username.as_deref() == Some(username))
            {
                return Err(StoreError::new(format!(
                    "username already taken: {username}"
                )));
            }
        }
        let mut user = User::new(UserId::generate(), new_user.username, Utc::now());
        user.email = new_user.email;
        user.name = new_user.name;
        self.users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(username: &str) -> NewUser {
        NewUser {
            username: Some(username.to_string()),
            ..NewUser::default()
        }
    }

    #[test]
    fn create_then_find() {
        let mut store = MemoryStore::new();
        let user = store.create_user(named("alice")).unwrap();
        let found = store.find_user_by_id(&user.id).unwrap().unwrap();
        assert_eq!(found, user);
        assert!(
            store
                .find_user_by_id(&UserId::new("missing").unwrap())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn usernames_must_be_unique() {
        let mut store = MemoryStore::new();
        store.create_user(named("alice")).unwrap();
        let err = store.create_user(named("alice")).unwrap_err();
        assert_eq!(err.to_string(), "username already taken: alice");
        // Users without a username never collide.
        store.create_user(NewUser::default()).unwrap();
        store.create_user(NewUser::default()).unwrap();
        assert_eq!(store.list_users().unwrap().len(), 3);
    }

    #[test]
    fn list_users_keeps_creation_order() {
        let mut store = MemoryStore::new();
        for name in ["carol", "alice", "bob"] {
            store.create_user(named(name)).unwrap();
        }
        let names: Vec<_> = store
            .list_users()
            .unwrap()
            .into_iter()
            .filter_map(|user| user.username)
            .collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn store_error_keeps_source() {
        let io = std::io::Error::other("disk full");
        let err = StoreError::new(io);
        assert_eq!(err.to_string(), "disk full");
        assert!(err.source().is_some());
    }
}
