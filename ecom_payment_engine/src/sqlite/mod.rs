//! SQLite database module for the e-commerce engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
