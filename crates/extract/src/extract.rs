//! Main extraction logic for CurseForge project pages.

use exn::OptionExt;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;
use tracing::instrument;

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{ContentHash, Maturity, Release, RemoteId};

/// How to treat a file row with no upload timestamp.
///
/// The site has served the listing both with and without the epoch attribute
/// over its lifetime, so deployments choose: `Strict` fails the page the way
/// any other missing mandatory field does, `Lenient` records the release
/// without a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    #[default]
    Strict,
    Lenient,
}

/// Extracts structured release data out of a parsed CurseForge page.
///
/// Pure with respect to its input document: no network, no state. One
/// instance wraps one fetched page.
#[derive(Debug)]
pub struct Extractor {
    document: Html,
}

impl Extractor {
    pub fn from_document(document: Html) -> Self {
        Self { document }
    }

    pub fn from_html(html: &str) -> Self {
        Self::from_document(Html::parse_document(html))
    }

    /// Extracts every release row of a project file listing, in document order.
    ///
    /// Maturity, filename, download path and version label are mandatory on
    /// every row; if any one is missing or malformed the whole call fails and
    /// yields nothing. A structural change on the site invalidates the whole
    /// page, not just one row, so partial results would only paper over a
    /// broken scrape.
    ///
    /// Callers should not read meaning into the order; the store re-keys
    /// everything by remote ID.
    #[instrument(skip(self), fields(mod_slug = mod_slug))]
    pub fn releases(&self, mod_slug: &str, policy: TimestampPolicy) -> Result<Vec<Release>> {
        let mut releases = Vec::new();
        for row in self.document.select(&consts::FILE_ROW_SELECTOR) {
            releases.push(Self::release_from_row(&row, mod_slug, policy)?);
        }
        tracing::debug!(count = releases.len(), "extracted release rows");
        Ok(releases)
    }

    fn release_from_row(row: &ElementRef<'_>, mod_slug: &str, policy: TimestampPolicy) -> Result<Release> {
        let maturity = row
            .select(&consts::MATURITY_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("title"))
            .map(Maturity::from)
            .ok_or_raise(|| ErrorKind::MissingField("maturity"))?;

        let link = row
            .select(&consts::NAME_LINK_SELECTOR)
            .next()
            .ok_or_raise(|| ErrorKind::MissingField("filename"))?;
        let filename = link.text().collect::<String>().trim().to_string();
        if filename.is_empty() {
            exn::bail!(ErrorKind::MissingField("filename"));
        }

        let href = link.value().attr("href").ok_or_raise(|| ErrorKind::MissingField("download path"))?;
        let remote_id = Self::remote_id_from_path(href)?;

        let version_label = row
            .select(&consts::VERSION_LABEL_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_raise(|| ErrorKind::MissingField("version label"))?;

        let uploaded_at = Self::uploaded_at(row, policy)?;

        Ok(Release {
            remote_id,
            mod_slug: mod_slug.to_string(),
            maturity,
            filename,
            version_label,
            uploaded_at,
            content_hash: None,
        })
    }

    /// The partial download path must look like `/projects/<slug>/files/<id>`;
    /// the trailing segment becomes the release's identity key.
    fn remote_id_from_path(href: &str) -> Result<RemoteId> {
        let captures = consts::DOWNLOAD_PATH_REGEX.captures(href).ok_or_raise(|| ErrorKind::ParseError {
            field: "download path",
            value: href.to_string(),
        })?;
        // Capture 1 is the slug as the site spells it; not cross-checked
        // against the requested mod, redirects make them diverge legitimately.
        Ok(RemoteId::from(captures.get(2).unwrap().as_str()))
    }

    fn uploaded_at(row: &ElementRef<'_>, policy: TimestampPolicy) -> Result<Option<UtcDateTime>> {
        let epoch = row.select(&consts::UPLOADED_SELECTOR).next().and_then(|el| el.value().attr("data-epoch"));
        let Some(epoch) = epoch else {
            return match policy {
                TimestampPolicy::Strict => exn::bail!(ErrorKind::MissingField("upload timestamp")),
                TimestampPolicy::Lenient => Ok(None),
            };
        };
        // A present-but-garbled attribute is a broken page under either policy.
        let seconds = epoch.parse::<i64>().ok().ok_or_raise(|| ErrorKind::ParseError {
            field: "upload timestamp",
            value: epoch.to_string(),
        })?;
        let uploaded = UtcDateTime::from_unix_timestamp(seconds).ok().ok_or_raise(|| ErrorKind::ParseError {
            field: "upload timestamp",
            value: epoch.to_string(),
        })?;
        Ok(Some(uploaded))
    }

    /// Extracts the MD5 content hash from a release detail page.
    ///
    /// Exactly one hash is expected per page; the first matching node wins.
    #[instrument(skip(self))]
    pub fn content_hash(&self) -> Result<ContentHash> {
        let text = self
            .document
            .select(&consts::CONTENT_HASH_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>())
            .ok_or_raise(|| ErrorKind::MissingField("content hash"))?;
        ContentHash::from_hex(text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn file_row(maturity: &str, filename: &str, href: &str, version: &str, epoch: Option<&str>) -> String {
        let uploaded = match epoch {
            Some(epoch) => {
                format!(r#"<td class="project-file-date-uploaded"><abbr data-epoch="{epoch}">date</abbr></td>"#)
            },
            None => r#"<td class="project-file-date-uploaded"></td>"#.to_string(),
        };
        format!(
            r#"<tr class="project-file-list-item">
                <td class="project-file-release-type"><div title="{maturity}"></div></td>
                <td class="project-file-name"><a class="overflow-tip" href="{href}">{filename}</a></td>
                {uploaded}
                <td class="project-file-game-version"><span class="version-label">{version}</span></td>
            </tr>"#
        )
    }

    fn listing(rows: &[String]) -> String {
        format!("<html><body><table>{}</table></body></html>", rows.join("\n"))
    }

    #[test]
    fn test_one_release_per_row_in_document_order() {
        let html = listing(&[
            file_row("Release", "foo-1.0.jar", "/projects/foo/files/100", "1.7.10", Some("1400000000")),
            file_row("Beta", "foo-1.1b.jar", "/projects/foo/files/101", "1.8", Some("1410000000")),
        ]);
        let releases = Extractor::from_html(&html).releases("foo", TimestampPolicy::Strict).unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].remote_id, RemoteId::from("100"));
        assert_eq!(releases[0].maturity, Maturity::Release);
        assert_eq!(releases[0].filename, "foo-1.0.jar");
        assert_eq!(releases[0].version_label, "1.7.10");
        assert_eq!(releases[0].uploaded_at.unwrap().unix_timestamp(), 1_400_000_000);
        assert!(releases[0].content_hash.is_none());
        assert_eq!(releases[1].remote_id, RemoteId::from("101"));
    }

    #[test]
    fn test_empty_listing_yields_no_releases() {
        let releases =
            Extractor::from_html("<html><body><table></table></body></html>").releases("foo", TimestampPolicy::Strict);
        assert!(releases.unwrap().is_empty());
    }

    #[rstest]
    #[case::no_maturity(r#"<td class="project-file-release-type"></td>"#)]
    #[case::no_filename(r#"<td class="project-file-release-type"><div title="Release"></div></td>"#)]
    fn test_missing_mandatory_field_fails_whole_batch(#[case] broken_cells: &str) {
        let good = file_row("Release", "foo-1.0.jar", "/projects/foo/files/100", "1.7.10", Some("1400000000"));
        let broken = format!(r#"<tr class="project-file-list-item">{broken_cells}</tr>"#);
        // A broken row poisons the batch even when other rows are fine.
        let html = listing(&[good, broken]);
        let result = Extractor::from_html(&html).releases("foo", TimestampPolicy::Strict);
        assert!(matches!(&*result.unwrap_err(), ErrorKind::MissingField(_)));
    }

    #[test]
    fn test_missing_version_label_fails() {
        let row = format!(
            r#"<tr class="project-file-list-item">
                <td class="project-file-release-type"><div title="Release"></div></td>
                <td class="project-file-name"><a class="overflow-tip" href="/projects/foo/files/100">a.jar</a></td>
                <td class="project-file-date-uploaded"><abbr data-epoch="1400000000">date</abbr></td>
                <td class="project-file-game-version"></td>
            </tr>"#
        );
        let result = Extractor::from_html(&listing(&[row])).releases("foo", TimestampPolicy::Strict);
        assert!(matches!(&*result.unwrap_err(), ErrorKind::MissingField("version label")));
    }

    #[rstest]
    #[case::no_files_segment("/projects/foo/100")]
    #[case::extra_segment("/projects/foo/files/100/download")]
    #[case::absolute_url("https://example.com/projects/foo/files/100")]
    fn test_unexpected_download_path_shape_fails(#[case] href: &str) {
        let html = listing(&[file_row("Release", "a.jar", href, "1.7.10", Some("1400000000"))]);
        let result = Extractor::from_html(&html).releases("foo", TimestampPolicy::Strict);
        assert!(matches!(
            &*result.unwrap_err(),
            ErrorKind::ParseError { field: "download path", .. }
        ));
    }

    #[test]
    fn test_missing_timestamp_strict_vs_lenient() {
        let html = listing(&[file_row("Release", "a.jar", "/projects/foo/files/100", "1.7.10", None)]);
        let strict = Extractor::from_html(&html).releases("foo", TimestampPolicy::Strict);
        assert!(matches!(&*strict.unwrap_err(), ErrorKind::MissingField("upload timestamp")));
        let lenient = Extractor::from_html(&html).releases("foo", TimestampPolicy::Lenient).unwrap();
        assert_eq!(lenient.len(), 1);
        assert!(lenient[0].uploaded_at.is_none());
    }

    #[test]
    fn test_garbled_timestamp_fails_even_lenient() {
        let html = listing(&[file_row("Release", "a.jar", "/projects/foo/files/100", "1.7.10", Some("soon"))]);
        let result = Extractor::from_html(&html).releases("foo", TimestampPolicy::Lenient);
        assert!(matches!(
            &*result.unwrap_err(),
            ErrorKind::ParseError { field: "upload timestamp", .. }
        ));
    }

    #[test]
    fn test_content_hash_from_detail_page() {
        let html = r#"<html><body>
            <div class="details-info">
                <ul><li><span class="md5">900150983cd24fb0d6963f7d28e17f72</span></li></ul>
            </div>
        </body></html>"#;
        let hash = Extractor::from_html(html).content_hash().unwrap();
        assert_eq!(hash.to_hex(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_content_hash_missing_node() {
        let result = Extractor::from_html("<html><body></body></html>").content_hash();
        assert!(matches!(&*result.unwrap_err(), ErrorKind::MissingField("content hash")));
    }

    #[test]
    fn test_content_hash_malformed_hex() {
        let html = r#"<div class="details-info"><span class="md5">not-a-digest</span></div>"#;
        let result = Extractor::from_html(html).content_hash();
        assert!(matches!(&*result.unwrap_err(), ErrorKind::Decode(_)));
    }
}
