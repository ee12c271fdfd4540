use exn::ResultExt;
use modwatch_extract::models::{ContentHash, Maturity, Release, RemoteId};
use time::UtcDateTime;

use crate::error::{Error, ErrorKind};

#[derive(sqlx::FromRow)]
pub(crate) struct ReleaseRow {
    pub(crate) remote_id: String,
    pub(crate) mod_slug: String,
    pub(crate) maturity: String,
    pub(crate) filename: String,
    pub(crate) version_label: String,
    pub(crate) uploaded_at: Option<i64>,
    pub(crate) content_hash: Option<Vec<u8>>,
}

impl From<&Release> for ReleaseRow {
    fn from(release: &Release) -> Self {
        Self {
            remote_id: release.remote_id.to_string(),
            mod_slug: release.mod_slug.clone(),
            maturity: release.maturity.as_str().to_string(),
            filename: release.filename.clone(),
            version_label: release.version_label.clone(),
            uploaded_at: release.uploaded_at.map(|at| at.unix_timestamp()),
            content_hash: release.content_hash.map(|hash| hash.as_bytes().to_vec()),
        }
    }
}

impl TryFrom<ReleaseRow> for Release {
    type Error = Error;
    fn try_from(row: ReleaseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            remote_id: RemoteId::from(row.remote_id),
            mod_slug: row.mod_slug,
            maturity: Maturity::from(row.maturity.as_str()),
            filename: row.filename,
            version_label: row.version_label,
            uploaded_at: row
                .uploaded_at
                .map(|at| UtcDateTime::from_unix_timestamp(at).or_raise(|| ErrorKind::InvalidData("uploaded at")))
                .transpose()?,
            content_hash: row
                .content_hash
                .as_deref()
                .map(|bytes| ContentHash::try_from(bytes).or_raise(|| ErrorKind::InvalidData("content hash")))
                .transpose()?,
        })
    }
}
