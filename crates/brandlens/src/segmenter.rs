//! URL path and language segmentation.
//!
//! A page such as `https://site.com/de/blog/post` splits into the language
//! `de`, the path `/blog/post` and the primary path `/blog`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Language reported when no path segment is a known code.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Path reported when nothing remains after removing the language segment.
pub const HOMEPAGE_PATH: &str = "/homepage";

/// Path reported for pages that cannot be read as URLs.
pub const INVALID_PATH: &str = "/invalid";

/// Language path segments recognized out of the box.
pub const DEFAULT_LANGUAGE_CODES: &[&str] = &[
    "ar", "bg", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "he", "hi", "hr", "hu",
    "id", "it", "ja", "ko", "lt", "lv", "ms", "nl", "no", "pl", "pt", "ro", "ru", "sk", "sl",
    "sr", "sv", "th", "tr", "uk", "vi", "zh", "en-us", "en-gb", "pt-br", "es-mx", "zh-cn",
    "zh-tw", "fr-ca", "de-at", "de-ch",
];

static RELATIVE_BASE: Lazy<Option<Url>> = Lazy::new(|| Url::parse("https://localhost/").ok());

/// The language/path split of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegments {
    pub lang: String,
    pub path: String,
    pub primary_path: String,
}

impl PathSegments {
    fn invalid() -> Self {
        Self {
            lang: UNKNOWN_LANGUAGE.to_string(),
            path: INVALID_PATH.to_string(),
            primary_path: INVALID_PATH.to_string(),
        }
    }
}

/// Interpret a page value as a URL.
///
/// Absolute URLs parse directly, bare paths (`/blog`) resolve against a
/// placeholder host, and scheme-less hosts (`site.com/blog`) are retried with
/// an `https://` prefix. Returns `None` when every attempt fails.
pub fn parse_page_url(page: &str) -> Option<Url> {
    let page = page.trim();
    if page.is_empty() {
        return None;
    }

    if page.starts_with('/') && !page.starts_with("//") {
        return RELATIVE_BASE.as_ref()?.join(page).ok();
    }

    match Url::parse(page) {
        Ok(url) if !url.cannot_be_a_base() => Some(url),
        _ if !page.contains("://") => Url::parse(&format!("https://{}", page)).ok(),
        _ => None,
    }
}

/// Split `pathname` into language and remaining path.
///
/// The first segment found in `known_codes` (compared lower-cased) becomes
/// the language; every other segment stays in the path.
pub fn segment(pathname: &str, known_codes: &HashSet<String>) -> PathSegments {
    let mut lang: Option<String> = None;
    let mut remaining: Vec<&str> = Vec::new();

    for part in pathname.split('/').filter(|part| !part.is_empty()) {
        if lang.is_none() {
            let lowered = part.to_lowercase();
            if known_codes.contains(&lowered) {
                lang = Some(lowered);
                continue;
            }
        }
        remaining.push(part);
    }

    let (path, primary_path) = match remaining.first() {
        Some(first) => (format!("/{}", remaining.join("/")), format!("/{}", first)),
        None => (HOMEPAGE_PATH.to_string(), HOMEPAGE_PATH.to_string()),
    };

    PathSegments {
        lang: lang.unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
        path,
        primary_path,
    }
}

/// Segments page URLs against a fixed set of language codes.
#[derive(Debug, Clone, Default)]
pub struct PathLanguageSegmenter {
    known_codes: HashSet<String>,
}

impl PathLanguageSegmenter {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known_codes: codes
                .into_iter()
                .map(|code| code.as_ref().trim().to_lowercase())
                .filter(|code| !code.is_empty())
                .collect(),
        }
    }

    /// A segmenter that recognizes no language, leaving every segment in the path.
    pub fn without_languages() -> Self {
        Self::default()
    }

    pub fn known_codes(&self) -> &HashSet<String> {
        &self.known_codes
    }

    pub fn segment(&self, pathname: &str) -> PathSegments {
        segment(pathname, &self.known_codes)
    }

    /// Parse `page` and segment its path, falling back to [`INVALID_PATH`].
    pub fn resolve(&self, page: &str) -> PathSegments {
        match parse_page_url(page) {
            Some(url) => self.segment(url.path()),
            None => {
                debug!("Could not parse page '{}' as a URL", page);
                PathSegments::invalid()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_segmenter() -> PathLanguageSegmenter {
        PathLanguageSegmenter::new(DEFAULT_LANGUAGE_CODES)
    }

    #[test]
    fn test_segment_with_language() {
        let segments = default_segmenter().segment("/de/blog/post");
        assert_eq!(segments.lang, "de");
        assert_eq!(segments.path, "/blog/post");
        assert_eq!(segments.primary_path, "/blog");
    }

    #[test]
    fn test_segment_language_case_insensitive() {
        let segments = default_segmenter().segment("/EN-US/Pricing");
        assert_eq!(segments.lang, "en-us");
        assert_eq!(segments.primary_path, "/Pricing");
    }

    #[test]
    fn test_segment_only_first_language_consumed() {
        let segments = default_segmenter().segment("/docs/fr/de");
        assert_eq!(segments.lang, "fr");
        assert_eq!(segments.path, "/docs/de");
        assert_eq!(segments.primary_path, "/docs");
    }

    #[test]
    fn test_segment_homepage() {
        let segments = default_segmenter().segment("/");
        assert_eq!(segments.lang, UNKNOWN_LANGUAGE);
        assert_eq!(segments.path, HOMEPAGE_PATH);
        assert_eq!(segments.primary_path, HOMEPAGE_PATH);

        let segments = default_segmenter().segment("/es/");
        assert_eq!(segments.lang, "es");
        assert_eq!(segments.path, HOMEPAGE_PATH);
    }

    #[test]
    fn test_segment_drops_empty_segments() {
        let segments = default_segmenter().segment("//blog///a/");
        assert_eq!(segments.path, "/blog/a");
    }

    #[test]
    fn test_without_languages_keeps_all_segments() {
        let segments = PathLanguageSegmenter::without_languages().segment("/en/blog");
        assert_eq!(segments.lang, UNKNOWN_LANGUAGE);
        assert_eq!(segments.primary_path, "/en");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let segments = default_segmenter().resolve("https://site.com/blog/a?x=1#top");
        assert_eq!(segments.path, "/blog/a");
        assert_eq!(segments.primary_path, "/blog");
    }

    #[test]
    fn test_resolve_scheme_less_url() {
        let segments = default_segmenter().resolve("site.com/it/shop");
        assert_eq!(segments.lang, "it");
        assert_eq!(segments.primary_path, "/shop");
    }

    #[test]
    fn test_resolve_bare_path() {
        let segments = default_segmenter().resolve("/pricing");
        assert_eq!(segments.primary_path, "/pricing");
    }

    #[test]
    fn test_parse_page_url_scheme_less_host_with_port() {
        let url = parse_page_url("localhost:8080/blog").unwrap();
        assert_eq!(url.path(), "/blog");
    }

    #[test]
    fn test_resolve_invalid_falls_back() {
        for page in ["http://[::1", "https://exa mple.com/a", ""] {
            let segments = default_segmenter().resolve(page);
            assert_eq!(segments.path, INVALID_PATH, "page: {page}");
            assert_eq!(segments.primary_path, INVALID_PATH);
            assert_eq!(segments.lang, UNKNOWN_LANGUAGE);
        }
    }
}
