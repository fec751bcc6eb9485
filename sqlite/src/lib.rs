//! SQLite implementation for relata
//!
//! This crate turns schema descriptors, conditions and order terms into SQLite
//! statements, and builds position-aware [`Relation`]s on top of them.

pub mod builder;
pub mod connection;
pub(crate) mod helpers;
pub mod pragma;
pub mod relation;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::{
    DEFAULT_BATCH_SIZE, Deleter, Inserter, Iter, OnConflict, Selector, Updater, create_model,
};
pub use connection::TransactionType;
pub use pragma::{JournalMode, Pragma};
pub use relation::Relation;
