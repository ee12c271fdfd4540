//! Matching local files against known releases.

use std::collections::HashMap;

use exn::ResultExt;
use modwatch_extract::models::{ContentHash, Release};
use modwatch_store::Repository;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::scan::LocalFile;

/// What a scan concluded about one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    /// The file's digest matches no known release. Reported to the
    /// operator, not an error: mods from other sites land here too.
    Unrecognized,
    /// The file is a known release, and it is the best one of its
    /// (mod, version label) group.
    Current(Release),
    /// The file is a known release, but the same mod has published a more
    /// recent file for the same version label.
    Superseded { matched: Release, better: Release },
}

/// Answers "is this a known release?" and "is something newer available?".
///
/// Both lookup tables are precomputed from a single pass over the store:
/// scanning a directory of N files against M known releases costs
/// O(N + M), not O(N x M). Build once per scan; the matcher does not see
/// writes made after construction.
pub struct Matcher {
    by_hash: HashMap<ContentHash, Release>,
    best: HashMap<(String, String), Release>,
}

impl Matcher {
    /// Build the lookup tables from everything currently stored.
    #[instrument(skip(repo))]
    pub async fn build(repo: &Repository) -> Result<Self> {
        let releases = repo.list_releases().await.or_raise(|| ErrorKind::Store)?;
        let mut by_hash: HashMap<ContentHash, Release> = HashMap::new();
        let mut best: HashMap<(String, String), Release> = HashMap::new();
        for release in releases {
            if let Some(hash) = release.content_hash {
                // Identical digests across releases would be an MD5
                // collision between published files; first by remote ID wins.
                let entry = by_hash.entry(hash).or_insert_with(|| release.clone());
                if release.remote_id < entry.remote_id {
                    *entry = release.clone();
                }
            }
            let key = (release.mod_slug.clone(), release.version_label.clone());
            let supersedes = best.get(&key).is_none_or(|current| newer(&release, current));
            if supersedes {
                best.insert(key, release);
            }
        }
        tracing::debug!(hashes = by_hash.len(), groups = best.len(), "built match tables");
        Ok(Self { by_hash, best })
    }

    /// The release whose content hash equals `hash`, if any.
    pub fn match_local(&self, hash: &ContentHash) -> Option<&Release> {
        self.by_hash.get(hash)
    }

    /// The best release of the matched release's own (mod, version label)
    /// group, when that is not the matched release itself.
    ///
    /// Never suggests anything for an unmatched hash, and never suggests a
    /// release uploaded before the matched one: the group's best is by
    /// construction the most recent.
    pub fn better_version(&self, hash: &ContentHash) -> Option<&Release> {
        let matched = self.match_local(hash)?;
        let key = (matched.mod_slug.clone(), matched.version_label.clone());
        let best = self.best.get(&key)?;
        (best.remote_id != matched.remote_id).then_some(best)
    }

    /// Full assessment of one scanned file.
    pub fn assess(&self, file: &LocalFile) -> Assessment {
        let Some(matched) = self.match_local(&file.hash) else {
            return Assessment::Unrecognized;
        };
        match self.better_version(&file.hash) {
            Some(better) => Assessment::Superseded {
                matched: matched.clone(),
                better: better.clone(),
            },
            None => Assessment::Current(matched.clone()),
        }
    }
}

/// Recency order within a (mod, version label) group: upload timestamp
/// first (untimestamped rows lose to timestamped ones), remote ID as the
/// deterministic tie-breaker.
fn newer(candidate: &Release, current: &Release) -> bool {
    (candidate.uploaded_at, &candidate.remote_id) > (current.uploaded_at, &current.remote_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modwatch_extract::models::{Maturity, RemoteId};
    use modwatch_store::Database;
    use std::path::PathBuf;
    use time::UtcDateTime;

    const HASH_A: &str = "900150983cd24fb0d6963f7d28e17f72";
    const HASH_B: &str = "d41d8cd98f00b204e9800998ecf8427e";
    const HASH_C: &str = "0cc175b9c0f1b6a831c399e269772661";

    fn release(remote_id: &str, slug: &str, label: &str, epoch: Option<i64>, hash: &str) -> Release {
        Release {
            remote_id: RemoteId::from(remote_id),
            mod_slug: slug.to_string(),
            maturity: Maturity::Release,
            filename: format!("{slug}-{remote_id}.jar"),
            version_label: label.to_string(),
            uploaded_at: epoch.and_then(|e| UtcDateTime::from_unix_timestamp(e).ok()),
            content_hash: ContentHash::from_hex(hash).ok(),
        }
    }

    fn local(hash: &str) -> LocalFile {
        LocalFile {
            filename: "local.jar".to_string(),
            path: PathBuf::from("mods/local.jar"),
            hash: ContentHash::from_hex(hash).unwrap(),
        }
    }

    async fn matcher_over(releases: &[Release]) -> Matcher {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        for release in releases {
            repo.ensure_mod(&release.mod_slug).await.unwrap();
            repo.upsert_release(release).await.unwrap();
        }
        Matcher::build(&repo).await.unwrap()
    }

    #[tokio::test]
    async fn test_match_and_no_match() {
        let matcher = matcher_over(&[release("100", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_A)]).await;
        let matched = matcher.match_local(&ContentHash::from_hex(HASH_A).unwrap()).unwrap();
        assert_eq!(matched.remote_id, RemoteId::from("100"));
        assert!(matcher.match_local(&ContentHash::from_hex(HASH_B).unwrap()).is_none());
        assert_eq!(matcher.assess(&local(HASH_B)), Assessment::Unrecognized);
    }

    #[tokio::test]
    async fn test_older_release_gets_suggestion_newest_gets_none() {
        // Two releases of the same mod sharing a version label; A earlier, B later.
        let a = release("100", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_A);
        let b = release("200", "buildcraft", "1.7.10", Some(1_450_000_000), HASH_B);
        let matcher = matcher_over(&[a, b]).await;
        let better = matcher.better_version(&ContentHash::from_hex(HASH_A).unwrap()).unwrap();
        assert_eq!(better.remote_id, RemoteId::from("200"));
        assert!(matcher.better_version(&ContentHash::from_hex(HASH_B).unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_version_label_isolates_groups() {
        // The newer 1.8.9 build must not be suggested over a 1.7.10 install.
        let old_line = release("100", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_A);
        let new_line = release("200", "buildcraft", "1.8.9", Some(1_450_000_000), HASH_B);
        let matcher = matcher_over(&[old_line, new_line]).await;
        assert!(matcher.better_version(&ContentHash::from_hex(HASH_A).unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_suggestion_is_never_older_than_match() {
        let newest = release("300", "buildcraft", "1.7.10", Some(1_460_000_000), HASH_C);
        let middle = release("200", "buildcraft", "1.7.10", Some(1_450_000_000), HASH_B);
        let oldest = release("100", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_A);
        let matcher = matcher_over(&[newest.clone(), middle, oldest]).await;
        for hash in [HASH_A, HASH_B] {
            let matched = matcher.match_local(&ContentHash::from_hex(hash).unwrap()).unwrap();
            let better = matcher.better_version(&ContentHash::from_hex(hash).unwrap()).unwrap();
            assert_eq!(better.remote_id, newest.remote_id);
            assert!(better.uploaded_at >= matched.uploaded_at);
        }
    }

    #[tokio::test]
    async fn test_uploaded_at_tie_breaks_by_remote_id() {
        let a = release("100", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_A);
        let b = release("200", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_B);
        let matcher = matcher_over(&[a, b]).await;
        let better = matcher.better_version(&ContentHash::from_hex(HASH_A).unwrap()).unwrap();
        assert_eq!(better.remote_id, RemoteId::from("200"));
    }

    #[tokio::test]
    async fn test_untimestamped_rows_lose_to_timestamped() {
        let dated = release("100", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_A);
        let undated = release("200", "buildcraft", "1.7.10", None, HASH_B);
        let matcher = matcher_over(&[dated, undated]).await;
        let better = matcher.better_version(&ContentHash::from_hex(HASH_B).unwrap()).unwrap();
        assert_eq!(better.remote_id, RemoteId::from("100"));
    }

    #[tokio::test]
    async fn test_assess_superseded_carries_both_releases() {
        let a = release("100", "buildcraft", "1.7.10", Some(1_400_000_000), HASH_A);
        let b = release("200", "buildcraft", "1.7.10", Some(1_450_000_000), HASH_B);
        let matcher = matcher_over(&[a, b]).await;
        match matcher.assess(&local(HASH_A)) {
            Assessment::Superseded { matched, better } => {
                assert_eq!(matched.remote_id, RemoteId::from("100"));
                assert_eq!(better.remote_id, RemoteId::from("200"));
            },
            other => panic!("expected Superseded, got {other:?}"),
        }
        assert!(matches!(matcher.assess(&local(HASH_B)), Assessment::Current(_)));
    }
}
