//! Transaction behavior for SQLite units of work

use std::fmt;

/// SQLite transaction types
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransactionType {
    #[default]
    /// A deferred transaction is the default - it does not acquire locks until needed
    Deferred,
    /// An immediate transaction acquires a RESERVED lock immediately
    Immediate,
    /// An exclusive transaction acquires an EXCLUSIVE lock immediately
    Exclusive,
}

impl TransactionType {
    /// The statement that opens a transaction of this type.
    pub const fn begin_sql(self) -> &'static str {
        match self {
            TransactionType::Deferred => "BEGIN DEFERRED",
            TransactionType::Immediate => "BEGIN IMMEDIATE",
            TransactionType::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionType::Deferred => "deferred",
            TransactionType::Immediate => "immediate",
            TransactionType::Exclusive => "exclusive",
        })
    }
}
