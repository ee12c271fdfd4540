//! Remote site access.
//!
//! Everything that talks to (or stands in for) the mod hosting site lives
//! here: URL derivation from mod slugs and remote IDs, the page fetch
//! capability, and the reconciler that brings the store's record of one
//! mod up to date with what the site currently lists.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod reconcile;
mod site;
mod source;

pub use crate::reconcile::{PageSelector, Reconciler};
pub use crate::site::Site;
pub use crate::source::{HttpSource, PageSource};
