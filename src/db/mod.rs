//! SQLite persistence.
//!
//! This module provides:
//! - Database initialization and schema setup
//! - SQLite pragma configuration
//! - The `Repository` backing wallets, match history and rosters

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
