use std::fmt::{Display, Formatter, Result as FmtResult};

use time::UtcDateTime;

use super::{ContentHash, Maturity};

/// The identifier the remote site assigns to a published file.
///
/// Unique across the whole site, not scoped to a mod - it is the store's
/// primary identity key for releases. Kept as a string: the site currently
/// issues numeric IDs but nothing downstream depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RemoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// One published file of one mod.
///
/// Extraction produces these with `content_hash` absent; the hash lives on a
/// separate detail page and costs a second round-trip, so it is filled in
/// lazily by the reconciler and never recomputed once known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Site-assigned identifier, unique across the entire store.
    pub remote_id: RemoteId,
    /// Slug of the owning mod.
    pub mod_slug: String,
    /// Informational maturity label.
    pub maturity: Maturity,
    /// Display filename. Not unique, and mutable between extractions.
    pub filename: String,
    /// Opaque game-compatibility tag, e.g. "1.7.10". Groups releases for
    /// "best available" comparisons; never compared numerically.
    pub version_label: String,
    /// Upload timestamp. Absent on site deployments that dropped the
    /// epoch attribute from the listing.
    pub uploaded_at: Option<UtcDateTime>,
    /// MD5 digest of the published file bytes, once known.
    pub content_hash: Option<ContentHash>,
}

impl Release {
    /// Site path of this release's detail page, derivable from the owning
    /// mod's slug and the remote ID alone. Never stored.
    pub fn detail_path(&self) -> String {
        format!("/projects/{}/files/{}", self.mod_slug, self.remote_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_path() {
        let release = Release {
            remote_id: RemoteId::from("2219693"),
            mod_slug: "applied-energistics-2".to_string(),
            maturity: Maturity::Beta,
            filename: "appliedenergistics2-rv2-beta-8.jar".to_string(),
            version_label: "1.7.10".to_string(),
            uploaded_at: None,
            content_hash: None,
        };
        assert_eq!(release.detail_path(), "/projects/applied-energistics-2/files/2219693");
    }
}
