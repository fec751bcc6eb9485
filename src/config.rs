//! Database configuration
//!
//! ```toml
//! path = "app.db"
//! busy_timeout_ms = 2000
//! journal_mode = "wal"
//! foreign_keys = true
//! transaction = "immediate"
//! ```

use relata_core::{RelataError, Result};
use relata_sqlite::{JournalMode, Pragma, TransactionType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How to open and tune a database connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
    /// Ignored for in-memory databases.
    pub journal_mode: JournalMode,
    pub foreign_keys: bool,
    /// Behavior of the transactions opened by units of work.
    pub transaction: TransactionType,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5000,
            journal_mode: JournalMode::Wal,
            foreign_keys: true,
            transaction: TransactionType::Deferred,
        }
    }
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| RelataError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| RelataError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn with_busy_timeout_ms(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = millis;
        self
    }

    pub fn with_journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn with_transaction(mut self, tx_type: TransactionType) -> Self {
        self.transaction = tx_type;
        self
    }

    #[inline]
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }

    /// Pragmas applied right after the connection is opened, in order.
    pub fn pragmas(&self) -> Vec<Pragma> {
        let mut pragmas = vec![
            Pragma::busy_timeout(self.busy_timeout_ms),
            Pragma::foreign_keys(self.foreign_keys),
        ];
        if !self.is_in_memory() {
            pragmas.push(Pragma::journal_mode(self.journal_mode));
        }
        pragmas
    }
}
