mod hash;
mod maturity;
mod release;

pub use self::hash::ContentHash;
pub use self::maturity::Maturity;
pub use self::release::{Release, RemoteId};
