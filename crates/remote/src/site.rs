//! URL derivation for the mod hosting site.

use exn::ResultExt;
use modwatch_extract::models::RemoteId;
use url::Url;

use crate::error::{ErrorKind, Result};

const DEFAULT_BASE: &str = "https://minecraft.curseforge.com/";

/// Derives every site URL the reconciler needs from a configured base.
///
/// All derivations are deterministic functions of the mod slug and (for
/// detail pages) the remote ID; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct Site {
    base: Url,
}

impl Default for Site {
    fn default() -> Self {
        // Safety: the default base is a constant, valid URL.
        Self { base: Url::parse(DEFAULT_BASE).unwrap() }
    }
}

impl Site {
    /// Create a site rooted at the given base URL.
    pub fn new(base: impl AsRef<str>) -> Result<Self> {
        let base = Url::parse(base.as_ref()).or_raise(|| ErrorKind::Url)?;
        if base.cannot_be_a_base() {
            exn::bail!(ErrorKind::Url);
        }
        Ok(Self { base })
    }

    /// The project page of a mod.
    pub fn project_url(&self, slug: &str) -> Result<Url> {
        self.base.join(&format!("/projects/{slug}")).or_raise(|| ErrorKind::Url)
    }

    /// The default file listing of a mod.
    pub fn files_url(&self, slug: &str) -> Result<Url> {
        self.base.join(&format!("/projects/{slug}/files")).or_raise(|| ErrorKind::Url)
    }

    /// Page `page` of a mod's file listing.
    pub fn files_page_url(&self, slug: &str, page: u32) -> Result<Url> {
        let mut url = self.files_url(slug)?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }

    /// The detail page of one release, which carries its content hash.
    pub fn release_url(&self, slug: &str, remote_id: &RemoteId) -> Result<Url> {
        self.base.join(&format!("/projects/{slug}/files/{remote_id}")).or_raise(|| ErrorKind::Url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_urls() {
        let site = Site::default();
        assert_eq!(site.project_url("buildcraft").unwrap().as_str(), "https://minecraft.curseforge.com/projects/buildcraft");
        assert_eq!(
            site.files_url("buildcraft").unwrap().as_str(),
            "https://minecraft.curseforge.com/projects/buildcraft/files"
        );
        assert_eq!(
            site.files_page_url("buildcraft", 3).unwrap().as_str(),
            "https://minecraft.curseforge.com/projects/buildcraft/files?page=3"
        );
        assert_eq!(
            site.release_url("buildcraft", &RemoteId::from("2219693")).unwrap().as_str(),
            "https://minecraft.curseforge.com/projects/buildcraft/files/2219693"
        );
    }

    #[test]
    fn test_custom_base() {
        let site = Site::new("http://localhost:8080/").unwrap();
        assert_eq!(site.files_url("foo").unwrap().as_str(), "http://localhost:8080/projects/foo/files");
    }

    #[test]
    fn test_rejects_unusable_base() {
        assert!(Site::new("not a url").is_err());
        assert!(Site::new("mailto:nobody@example.com").is_err());
    }
}
