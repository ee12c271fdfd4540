//! Repository for tracked mods and their releases.

use exn::ResultExt;
use modwatch_extract::models::{ContentHash, Release, RemoteId};
use sqlx::SqlitePool;

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::ReleaseRow;

/// Repository over the mods and releases tables.
///
/// All writes are atomic per release: the upsert is a single
/// `INSERT .. ON CONFLICT` statement, so there is no window in which a
/// probe has decided "insert" while another writer slips a row in, and a
/// crash mid-statement rolls back to the previous row state.
///
/// # Relationships
///
/// - A mod owns zero or more releases; releases never move between mods.
/// - `remote_id` identifies a release across the whole store.
/// - Deleting a mod cascades to its releases (mods are never deleted by
///   the reconcile core itself).
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Mods
    // =========================================================================

    /// Idempotent get-or-create of a mod by slug.
    ///
    /// Requesting a mod that already exists neither duplicates it nor
    /// touches its releases.
    pub async fn ensure_mod(&self, slug: impl AsRef<str>) -> Result<()> {
        sqlx::query(include_str!("../queries/ensure_mod.sql"))
            .bind(slug.as_ref())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// List all tracked mod slugs, ordered by name.
    pub async fn list_mods(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(include_str!("../queries/list_mods.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    // =========================================================================
    // Releases: write path
    // =========================================================================

    /// Existence probe by remote ID.
    ///
    /// The reconciler uses this to decide whether a candidate release needs
    /// its detail page fetched before the upsert.
    pub async fn count_by_remote_id(&self, remote_id: &RemoteId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_by_remote_id.sql"))
            .bind(remote_id.as_str())
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(count.unsigned_abs())
    }

    /// Insert a release, or update its mutable fields if the remote ID is
    /// already known.
    ///
    /// One atomic statement. On the update path only maturity, filename,
    /// version label and upload timestamp change: the remote ID and the mod
    /// linkage are immutable after creation, and an update carrying no
    /// content hash never clears a stored one.
    pub async fn upsert_release(&self, release: &Release) -> Result<()> {
        let row = ReleaseRow::from(release);
        sqlx::query(include_str!("../queries/upsert_release.sql"))
            .bind(row.remote_id)
            .bind(row.mod_slug)
            .bind(row.maturity)
            .bind(row.filename)
            .bind(row.version_label)
            .bind(row.uploaded_at)
            .bind(row.content_hash)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Point lookup of a release's stored content hash.
    ///
    /// Absent both for unknown remote IDs and for releases whose hash has
    /// not been fetched yet.
    pub async fn get_content_hash(&self, remote_id: &RemoteId) -> Result<Option<ContentHash>> {
        let bytes: Option<Option<Vec<u8>>> = sqlx::query_scalar(include_str!("../queries/get_content_hash.sql"))
            .bind(remote_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        bytes
            .flatten()
            .map(|bytes| ContentHash::try_from(&bytes[..]).or_raise(|| ErrorKind::InvalidData("content hash")))
            .transpose()
    }

    /// One-time fill of a release's content hash.
    ///
    /// The hash is a content-derived fact, not a mutable attribute: callers
    /// only invoke this when [`get_content_hash`](Self::get_content_hash)
    /// reported it absent, and the statement itself refuses to overwrite a
    /// present value.
    pub async fn set_content_hash(&self, remote_id: &RemoteId, hash: &ContentHash) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/set_content_hash.sql"))
            .bind(remote_id.as_str())
            .bind(&hash.as_bytes()[..])
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            tracing::debug!(remote_id = %remote_id, "content hash already present; fill skipped");
        }
        Ok(())
    }

    // =========================================================================
    // Releases: read path
    // =========================================================================

    /// Find the release whose stored content hash equals `hash`.
    ///
    /// Distinct releases sharing a digest would be an MD5 collision between
    /// published mod files; if it ever happens the lowest remote ID wins,
    /// deterministically.
    pub async fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Release>> {
        let row: Option<ReleaseRow> = sqlx::query_as(include_str!("../queries/find_by_content_hash.sql"))
            .bind(&hash.as_bytes()[..])
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Release::try_from).transpose()
    }

    /// List every stored release, across all mods.
    ///
    /// This is the single pass the match/best-version resolver builds its
    /// lookup tables from; per-file queries never go back to the database.
    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        let rows: Vec<ReleaseRow> = sqlx::query_as(include_str!("../queries/list_releases.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Release::try_from).collect()
    }

    /// List one mod's releases, newest first.
    ///
    /// This is the read model behind the per-mod status page / report.
    pub async fn list_releases_for_mod(&self, slug: impl AsRef<str>) -> Result<Vec<Release>> {
        let rows: Vec<ReleaseRow> = sqlx::query_as(include_str!("../queries/list_releases_for_mod.sql"))
            .bind(slug.as_ref())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Release::try_from).collect()
    }
}
