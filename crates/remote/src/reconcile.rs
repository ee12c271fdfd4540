//! Reconciliation of one mod's stored releases against the site.

use exn::ResultExt;
use modwatch_extract::models::{ContentHash, Release};
use modwatch_extract::{Extractor, TimestampPolicy};
use modwatch_store::Repository;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::site::Site;
use crate::source::PageSource;

/// Which slice of a mod's file listing to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSelector {
    /// The default listing the site serves without a page parameter.
    #[default]
    Default,
    /// An explicit page of the listing.
    Page(u32),
}

/// Brings the stored record of one mod up to date with the remote site.
///
/// The expensive part of a release is its content hash: it lives on a
/// separate detail page, so it is fetched exactly once, when the release
/// is first seen, and back-filled lazily on later runs if that first fetch
/// never happened (rows predating hash support, or a prior run that died
/// between insert and fill).
pub struct Reconciler<'a> {
    source: &'a dyn PageSource,
    site: &'a Site,
    repo: &'a Repository,
    policy: TimestampPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(source: &'a dyn PageSource, site: &'a Site, repo: &'a Repository, policy: TimestampPolicy) -> Self {
        Self { source, site, repo, policy }
    }

    /// Reconcile one mod against the selected listing page.
    ///
    /// Succeeds only if every listed release was processed; the first
    /// unrecovered extraction, fetch or store failure aborts this mod and
    /// surfaces as the overall error. Batch drivers are expected to log it
    /// and move on to the next mod, not to give up on the batch.
    #[instrument(skip(self), fields(mod_slug = slug))]
    pub async fn reconcile(&self, slug: &str, pages: PageSelector) -> Result<()> {
        let url = match pages {
            PageSelector::Default => self.site.files_url(slug)?,
            PageSelector::Page(page) => self.site.files_page_url(slug, page)?,
        };
        let listing = self.source.fetch(&url).await?;
        let releases = Extractor::from_html(&listing).releases(slug, self.policy).or_raise(|| ErrorKind::Extract)?;
        self.repo.ensure_mod(slug).await.or_raise(|| ErrorKind::Store)?;
        for release in releases {
            self.record(release).await?;
        }
        Ok(())
    }

    /// Insert or refresh a single candidate release.
    async fn record(&self, mut release: Release) -> Result<()> {
        let known = self.repo.count_by_remote_id(&release.remote_id).await.or_raise(|| ErrorKind::Store)? > 0;
        if !known {
            // A release with no recoverable hash is incompletely known;
            // failing here aborts the whole reconcile on purpose.
            release.content_hash = Some(self.fetch_content_hash(&release).await?);
            self.repo.upsert_release(&release).await.or_raise(|| ErrorKind::Store)?;
            tracing::info!(remote_id = %release.remote_id, filename = %release.filename, "recorded new release");
            return Ok(());
        }
        self.repo.upsert_release(&release).await.or_raise(|| ErrorKind::Store)?;
        // Self-healing: rows created before hashing existed, or whose hash
        // fetch failed on an earlier run, get their hash filled now.
        if self.repo.get_content_hash(&release.remote_id).await.or_raise(|| ErrorKind::Store)?.is_none() {
            let hash = self.fetch_content_hash(&release).await?;
            self.repo.set_content_hash(&release.remote_id, &hash).await.or_raise(|| ErrorKind::Store)?;
            tracing::info!(remote_id = %release.remote_id, "back-filled missing content hash");
        }
        Ok(())
    }

    async fn fetch_content_hash(&self, release: &Release) -> Result<ContentHash> {
        let url = self.site.release_url(&release.mod_slug, &release.remote_id)?;
        let detail = self.source.fetch(&url).await?;
        Extractor::from_html(&detail).content_hash().or_raise(|| ErrorKind::Extract)
    }
}
