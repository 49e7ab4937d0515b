//! SQLite state database for system EEPROM contents.
//!
//! This is the database tier: an authoritative copy of the EEPROM written on
//! initialization and read back instead of touching hardware. Contents are
//! stored with their BLAKE3 hash and verified on every read.
//!
//! Callers are synchronous; [`BlockingStateDb`] drives the async `sqlx`
//! pool on a private current-thread runtime.

mod blocking;
mod db;
pub mod error;
mod repo;

pub use crate::blocking::BlockingStateDb;
pub use crate::db::Database;
pub use crate::repo::{Record, Repository};
