//! Database schema and record types

/// SQL schema for initialization
///
/// `english_word` is unique ignoring ASCII case (`COLLATE NOCASE`), so
/// "Cat" and "cat" resolve to the same catalog entry while "Éclair" and
/// "éclair" stay distinct.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS word_set (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    english_word TEXT NOT NULL UNIQUE COLLATE NOCASE,
    translation TEXT NOT NULL,
    seeded BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS telegram_users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    telegram_id INTEGER NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES telegram_users(user_id),
    word_id INTEGER NOT NULL REFERENCES word_set(id),
    UNIQUE (user_id, word_id)
);

CREATE TABLE IF NOT EXISTS deleted_words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES telegram_users(user_id),
    word_id INTEGER NOT NULL REFERENCES word_set(id),
    UNIQUE (user_id, word_id)
);

CREATE INDEX IF NOT EXISTS idx_user_words_user ON user_words(user_id);
CREATE INDEX IF NOT EXISTS idx_deleted_words_user ON deleted_words(user_id);
";

/// Word pairs every user studies until they exclude them
pub const SEED_WORDS: &[(&str, &str)] = &[
    ("run", "бегать"),
    ("beautiful", "красивый"),
    ("quickly", "быстро"),
    ("book", "книга"),
    ("happy", "счастливый"),
    ("dance", "танцевать"),
    ("friend", "друг"),
    ("carefully", "осторожно"),
    ("write", "писать"),
    ("strong", "сильный"),
    ("city", "город"),
    ("easily", "легко"),
    ("play", "играть"),
    ("interesting", "интересный"),
    ("house", "дом"),
    ("room", "комната"),
    ("prepare", "готовиться"),
];

pub type WordId = i64;
pub type UserId = i64;

/// A catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub id: WordId,
    pub source_word: String,
    pub translation: String,
    /// Inserted by the startup seed rather than by a user
    pub seeded: bool,
}

/// A source word with its translation, without catalog identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    pub source_word: String,
    pub translation: String,
}

impl From<WordEntry> for WordPair {
    fn from(entry: WordEntry) -> Self {
        Self {
            source_word: entry.source_word,
            translation: entry.translation,
        }
    }
}
