//! SQLite PRAGMA statements applied when a database is opened
//!
//! [SQLite PRAGMA Documentation](https://sqlite.org/pragma.html)

use std::fmt;

/// Journal mode for database transactions
///
/// See: <https://sqlite.org/pragma.html#pragma_journal_mode>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum JournalMode {
    /// Delete the rollback journal after each transaction
    Delete,
    /// Truncate the rollback journal to zero length
    Truncate,
    /// Keep the rollback journal and overwrite its header
    Persist,
    /// Keep the rollback journal in memory
    Memory,
    /// Write-ahead logging
    #[default]
    Wal,
    /// No rollback journal
    Off,
}

impl JournalMode {
    pub const fn as_sql(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

/// A connection-level setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pragma {
    /// Enforce foreign key constraints.
    ///
    /// See: <https://sqlite.org/pragma.html#pragma_foreign_keys>
    ForeignKeys(bool),
    /// See: <https://sqlite.org/pragma.html#pragma_journal_mode>
    JournalMode(JournalMode),
    /// Milliseconds to wait on a locked database before failing.
    ///
    /// See: <https://sqlite.org/pragma.html#pragma_busy_timeout>
    BusyTimeout(u64),
}

impl Pragma {
    pub const fn foreign_keys(enabled: bool) -> Self {
        Self::ForeignKeys(enabled)
    }

    pub const fn journal_mode(mode: JournalMode) -> Self {
        Self::JournalMode(mode)
    }

    pub const fn busy_timeout(millis: u64) -> Self {
        Self::BusyTimeout(millis)
    }

    /// Whether the store answers this pragma with a result row.
    pub const fn returns_row(&self) -> bool {
        matches!(self, Pragma::JournalMode(_) | Pragma::BusyTimeout(_))
    }
}

impl fmt::Display for Pragma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pragma::ForeignKeys(enabled) => write!(
                f,
                "PRAGMA foreign_keys = {}",
                if *enabled { "ON" } else { "OFF" }
            ),
            Pragma::JournalMode(mode) => write!(f, "PRAGMA journal_mode = {}", mode.as_sql()),
            Pragma::BusyTimeout(millis) => write!(f, "PRAGMA busy_timeout = {millis}"),
        }
    }
}
