//! Database module for the vocabulary trainer
//!
//! Provides persistence for the shared word catalog, the user registry and
//! the per-user ownership ledger (included and excluded words).

mod schema;

pub use schema::*;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database lock poisoned")]
    LockPoisoned,
    #[error("Word not found after insert: {0}")]
    WordVanished(String),
    #[error("User not found after insert: {0}")]
    UserVanished(i64),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert the seed catalog, skipping words that already exist.
    ///
    /// Returns the number of rows actually inserted.
    pub fn seed(&self, words: &[(&str, &str)]) -> DbResult<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO word_set (english_word, translation, seeded) VALUES (?1, ?2, 1)
                 ON CONFLICT(english_word) DO NOTHING",
            )?;
            for (word, translation) in words {
                inserted += stmt.execute(params![word, translation])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    // ==================== Catalog Operations ====================

    /// Pick one catalog entry uniformly at random
    pub fn random_word(&self) -> DbResult<Option<WordPair>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT english_word, translation FROM word_set ORDER BY RANDOM() LIMIT 1",
            [],
            |row| {
                Ok(WordPair {
                    source_word: row.get(0)?,
                    translation: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(DbError::from)
    }

    /// Up to `n` random distinct source words other than `exclude`
    pub fn distractors(&self, exclude: &str, n: usize) -> DbResult<Vec<String>> {
        let conn = self.conn()?;
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT english_word FROM word_set
             WHERE english_word != ?1
             ORDER BY RANDOM()
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![exclude, limit], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Insert a word unless one with the same source word exists; either way
    /// return the id of the catalog row holding that source word.
    pub fn insert_word_if_absent(&self, source_word: &str, translation: &str) -> DbResult<WordId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO word_set (english_word, translation) VALUES (?1, ?2)
             ON CONFLICT(english_word) DO NOTHING",
            params![source_word, translation],
        )?;
        conn.query_row(
            "SELECT id FROM word_set WHERE english_word = ?1",
            params![source_word],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| DbError::WordVanished(source_word.to_string()))
    }

    /// Look up a catalog entry by source word
    pub fn find_word(&self, source_word: &str) -> DbResult<Option<WordEntry>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, english_word, translation, seeded FROM word_set WHERE english_word = ?1",
            params![source_word],
            parse_word_row,
        )
        .optional()
        .map_err(DbError::from)
    }

    pub fn catalog_size(&self) -> DbResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM word_set", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// All catalog entries in insertion order
    pub fn list_catalog(&self) -> DbResult<Vec<WordEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, english_word, translation, seeded FROM word_set ORDER BY id",
        )?;
        let rows = stmt.query_map([], parse_word_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    // ==================== User Operations ====================

    /// Lookup-or-create the internal id for a platform user
    pub fn ensure_user(&self, telegram_id: i64) -> DbResult<UserId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO telegram_users (telegram_id, created_at) VALUES (?1, ?2)
             ON CONFLICT(telegram_id) DO NOTHING",
            params![telegram_id, Utc::now().to_rfc3339()],
        )?;
        conn.query_row(
            "SELECT user_id FROM telegram_users WHERE telegram_id = ?1",
            params![telegram_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(DbError::UserVanished(telegram_id))
    }

    pub fn find_user(&self, telegram_id: i64) -> DbResult<Option<UserId>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT user_id FROM telegram_users WHERE telegram_id = ?1",
            params![telegram_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(DbError::from)
    }

    // ==================== Ownership Operations ====================

    /// Record that a user explicitly added a word (no-op if already recorded)
    pub fn add_ownership(&self, user_id: UserId, word_id: WordId) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO user_words (user_id, word_id) VALUES (?1, ?2)
             ON CONFLICT(user_id, word_id) DO NOTHING",
            params![user_id, word_id],
        )?;
        Ok(())
    }

    /// Remove an include record. Returns whether a record existed.
    pub fn remove_ownership(&self, user_id: UserId, word_id: WordId) -> DbResult<bool> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM user_words WHERE user_id = ?1 AND word_id = ?2",
            params![user_id, word_id],
        )?;
        Ok(removed > 0)
    }

    pub fn add_exclusion(&self, user_id: UserId, word_id: WordId) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO deleted_words (user_id, word_id) VALUES (?1, ?2)
             ON CONFLICT(user_id, word_id) DO NOTHING",
            params![user_id, word_id],
        )?;
        Ok(())
    }

    pub fn list_owned(&self, user_id: UserId) -> DbResult<Vec<WordId>> {
        self.list_word_ids("SELECT word_id FROM user_words WHERE user_id = ?1 ORDER BY word_id", user_id)
    }

    pub fn list_excluded(&self, user_id: UserId) -> DbResult<Vec<WordId>> {
        self.list_word_ids(
            "SELECT word_id FROM deleted_words WHERE user_id = ?1 ORDER BY word_id",
            user_id,
        )
    }

    fn list_word_ids(&self, sql: &str, user_id: UserId) -> DbResult<Vec<WordId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn parse_word_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WordEntry> {
    Ok(WordEntry {
        id: row.get(0)?,
        source_word: row.get(1)?,
        translation: row.get(2)?,
        seeded: row.get(3)?,
    })
}
