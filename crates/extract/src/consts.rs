use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// One table row per published file on the project's file listing.
selector!(FILE_ROW_SELECTOR, "tr.project-file-list-item");
// Within a row: the release type cell carries the maturity label as a title attribute.
selector!(MATURITY_SELECTOR, "td.project-file-release-type div[title]");
// Within a row: the overflow-tip anchor carries both the display filename
// (text) and the partial download path (href).
selector!(NAME_LINK_SELECTOR, "td.project-file-name a.overflow-tip");
// Within a row: the game-compatibility tag the release was published for.
selector!(VERSION_LABEL_SELECTOR, "td.project-file-game-version span.version-label");
// Within a row: upload timestamp, epoch seconds. Not present on every
// deployment of the site; see [`TimestampPolicy`](crate::TimestampPolicy).
selector!(UPLOADED_SELECTOR, "td.project-file-date-uploaded abbr[data-epoch]");
// On a release detail page: the MD5 checksum of the published file.
selector!(CONTENT_HASH_SELECTOR, "div.details-info span.md5");

// The partial download path must have exactly this shape; the trailing
// segment is the site-assigned release identifier.
regex!(DOWNLOAD_PATH_REGEX, r"^/projects/([^/]+)/files/([^/]+)$");
