//! Content hashing of local files.

use std::path::Path;

use exn::ResultExt;
use md5::{Digest, Md5};
use modwatch_extract::models::ContentHash;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the MD5 content digest of a file.
///
/// Streams the file in fixed-size chunks; mod files run to tens of
/// megabytes and a whole directory of them is hashed per scan, so the
/// file is never held in memory at once.
///
/// MD5 matches the digest the site publishes on release detail pages.
/// Platform artifacts (hidden files, directory metadata markers) are the
/// caller's job to filter before getting here.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub async fn hash_file(path: impl AsRef<Path>) -> Result<ContentHash> {
    let path = path.as_ref();
    let mut file = File::open(path).await.or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer).await.or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(ContentHash::from(<[u8; 16]>::from(hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    async fn digest_of(contents: &[u8]) -> String {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        hash_file(file.path()).await.unwrap().to_hex()
    }

    // Known-answer digests from RFC 1321's test suite.
    #[tokio::test]
    async fn test_empty_file() {
        assert_eq!(digest_of(b"").await, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[tokio::test]
    async fn test_small_literal() {
        assert_eq!(digest_of(b"abc").await, "900150983cd24fb0d6963f7d28e17f72");
    }

    #[tokio::test]
    async fn test_spans_multiple_chunks() {
        // 3 chunks and a bit, to cross the buffer boundary.
        let contents = vec![0x61u8; CHUNK_SIZE * 3 + 17];
        let streamed = digest_of(&contents).await;
        let whole = {
            let mut hasher = Md5::new();
            hasher.update(&contents);
            ContentHash::from(<[u8; 16]>::from(hasher.finalize())).to_hex()
        };
        assert_eq!(streamed, whole);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = hash_file("/nonexistent/into-the-void.jar").await;
        assert!(matches!(&*result.unwrap_err(), ErrorKind::Io(_)));
    }
}
