//! SQLite storage for the response cache.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration

pub mod migrations;

pub use migrations::init_db;
