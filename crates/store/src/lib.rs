//! SQLite store for tracked mods and their known releases.
//!
//! This crate owns the durable record of everything the reconciler has ever
//! learned from the site: which mods are tracked, which releases each one
//! has published, and the MD5 content hash of each release's file once it
//! has been fetched.
//!
//! # Architecture
//! Two tables:
//! - **mods**: one row per tracked mod, keyed by site slug.
//! - **releases**: one row per published file, keyed globally by the
//!   site-assigned remote ID. Re-extracting a known remote ID updates the
//!   row in place; it never duplicates and never moves the release to a
//!   different mod.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::repo::Repository;
