//! Storage layer for the activity ledger.
//!
//! Provides a [`RecordStore`] backed by `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! For multi-threaded access, either:
//! - Use a `Mutex<Ledger<Database, _>>` to serialize access
//! - Use separate `Database` instances per thread (each `save` runs in its own
//!   transaction, but concurrent read-modify-write cycles on the same user can
//!   then overwrite each other)
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). This ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! ## Activity Order
//!
//! The `position` column records each entry's index in its user's list, so
//! entries read back in insertion order. A day-scoped overwrite keeps its
//! position.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use eco_core::{
    ActivityEntry, ActivityType, EntryId, NewUser, RecordStore, StoreError, UnknownActivityType,
    User, UserId, ValidationError,
};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for record {record_id}: {timestamp}")]
    TimestampParse {
        record_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored activity has a category outside the known set.
    #[error("invalid category for entry {entry_id}")]
    InvalidCategory {
        entry_id: String,
        #[source]
        source: UnknownActivityType,
    },
    /// A stored identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] ValidationError),
    /// Another user already has this username.
    #[error("username already taken: {0}")]
    UsernameTaken(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::new(err)
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

#[derive(Debug)]
struct UserRow {
    id: String,
    username: Option<String>,
    email: Option<String>,
    name: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(Debug)]
struct ActivityRow {
    id: String,
    category: String,
    value: f64,
    recorded_at: String,
}

const USER_COLUMNS: &str = "id, username, email, name, created_at, updated_at";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE,
                email TEXT,
                name TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Activities table: one row per ledger entry
            -- category: activity type name (e.g., 'RoomTemperature')
            -- recorded_at: RFC 3339 with milliseconds (e.g., '2024-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                category TEXT NOT NULL,
                value REAL NOT NULL,
                recorded_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_activities_user ON activities(user_id, position);
            CREATE INDEX IF NOT EXISTS idx_activities_recorded ON activities(recorded_at);
            ",
        )?;
        Ok(())
    }

    /// Loads one user with their activities.
    pub fn get_user(&self, id: &UserId) -> Result<Option<User>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [id.as_str()],
                read_user_row,
            )
            .optional()?;
        row.map(|row| self.hydrate(row)).transpose()
    }

    /// Lists all users in creation order.
    pub fn get_users(&self) -> Result<Vec<User>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY rowid ASC"))?;
        let rows = stmt.query_map([], read_user_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(self.hydrate(row?)?);
        }
        Ok(users)
    }

    /// Finds a user's ID by username.
    pub fn find_user_id_by_username(&self, username: &str) -> Result<Option<UserId>, DbError> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE username = ?",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(UserId::new).transpose()?)
    }

    /// Writes a user and replaces their activity rows in one transaction.
    pub fn put_user(&mut self, user: &User) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        upsert_user(&tx, user)?;
        tx.execute("DELETE FROM activities WHERE user_id = ?", [user.id.as_str()])?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO activities (id, user_id, position, category, value, recorded_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )?;
            for (position, entry) in user.activities.iter().enumerate() {
                stmt.execute(params![
                    entry.id.as_str(),
                    user.id.as_str(),
                    i64::try_from(position).unwrap_or(i64::MAX),
                    entry.category.as_str(),
                    entry.value,
                    format_timestamp(entry.recorded_at),
                ])?;
            }
        }
        tx.commit()?;
        tracing::trace!(user_id = %user.id, entries = user.activities.len(), "saved user");
        Ok(())
    }

    /// Registers a new user with a generated ID.
    pub fn insert_user(&mut self, new_user: NewUser) -> Result<User, DbError> {
        self.insert_user_at(new_user, Utc::now())
    }

    fn insert_user_at(&mut self, new_user: NewUser, now: DateTime<Utc>) -> Result<User, DbError> {
        let tx = self.conn.transaction()?;
        if let Some(username) = new_user.username.as_deref() {
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
                [username],
                |row| row.get(0),
            )?;
            if taken {
                return Err(DbError::UsernameTaken(username.to_string()));
            }
        }
        let mut user = User::new(UserId::generate(), new_user.username, now);
        user.email = new_user.email;
        user.name = new_user.name;
        upsert_user(&tx, &user)?;
        tx.commit()?;
        tracing::debug!(user_id = %user.id, "registered user");
        Ok(user)
    }

    fn hydrate(&self, row: UserRow) -> Result<User, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, category, value, recorded_at
            FROM activities
            WHERE user_id = ?
            ORDER BY position ASC
            ",
        )?;
        let rows = stmt.query_map([row.id.as_str()], |r| {
            Ok(ActivityRow {
                id: r.get(0)?,
                category: r.get(1)?,
                value: r.get(2)?,
                recorded_at: r.get(3)?,
            })
        })?;
        let mut activities = Vec::new();
        for activity in rows {
            activities.push(parse_activity(activity?)?);
        }

        Ok(User {
            created_at: parse_timestamp(&row.created_at, &row.id)?,
            updated_at: parse_timestamp(&row.updated_at, &row.id)?,
            id: UserId::new(row.id)?,
            username: row.username,
            email: row.email,
            name: row.name,
            activities,
        })
    }
}

impl RecordStore for Database {
    fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.get_user(id)?)
    }

    fn save(&mut self, user: &User) -> Result<(), StoreError> {
        Ok(self.put_user(user)?)
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.get_users()?)
    }

    fn create_user(&mut self, new_user: NewUser) -> Result<User, StoreError> {
        Ok(self.insert_user(new_user)?)
    }
}

fn read_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn upsert_user(tx: &Transaction<'_>, user: &User) -> Result<(), DbError> {
    tx.execute(
        "
        INSERT INTO users (id, username, email, name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            username = excluded.username,
            email = excluded.email,
            name = excluded.name,
            updated_at = excluded.updated_at
        ",
        params![
            user.id.as_str(),
            user.username,
            user.email,
            user.name,
            format_timestamp(user.created_at),
            format_timestamp(user.updated_at),
        ],
    )?;
    Ok(())
}

fn parse_activity(row: ActivityRow) -> Result<ActivityEntry, DbError> {
    let category: ActivityType =
        row.category
            .parse()
            .map_err(|source| DbError::InvalidCategory {
                entry_id: row.id.clone(),
                source,
            })?;
    Ok(ActivityEntry {
        recorded_at: parse_timestamp(&row.recorded_at, &row.id)?,
        id: EntryId::new(row.id)?,
        category,
        value: row.value,
    })
}

fn parse_timestamp(timestamp: &str, record_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record_id: record_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
