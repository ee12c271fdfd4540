//! HTML parsing and release metadata extraction for CurseForge project pages.
//!
//! CurseForge has no public API for the data we need, so this crate screen
//! scrapes two page shapes: the file listing of a project (one table row per
//! published release) and the detail page of a single release (which carries
//! the MD5 checksum of the published file). The page structure is assumed,
//! not negotiated - when it deviates, extraction fails hard with a parse
//! error rather than returning half a page.

mod consts;
pub mod error;
mod extract;
pub mod models;

pub use crate::extract::{Extractor, TimestampPolicy};
