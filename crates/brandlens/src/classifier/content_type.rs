//! URL → content category classification with memoization.

use crate::segmenter::parse_page_url;
use crate::types::ContentType;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered path rules; the first rule with a matching fragment wins.
const CONTENT_RULES: [(&[&str], ContentType); 5] = [
    (&["/blog", "/article", "/news"], ContentType::Blog),
    (&["/product", "/pricing", "/shop"], ContentType::Product),
    (&["/support", "/help", "/faq"], ContentType::Support),
    (&["/about", "/company", "/team"], ContentType::About),
    (&["/login", "/signin", "/account"], ContentType::Auth),
];

/// Stateless rule evaluator.
pub struct ContentTypeClassifier;

impl ContentTypeClassifier {
    /// Classify a page URL.
    ///
    /// Rules are tested against the lower-cased path of the URL (or the whole
    /// lower-cased string if it cannot be parsed), so host names such as
    /// `news.example.com` never trigger a path rule.
    pub fn classify(url: &str) -> ContentType {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return ContentType::Unknown;
        }

        let path = match parse_page_url(trimmed) {
            Some(parsed) => parsed.path().to_lowercase(),
            None => trimmed.to_lowercase(),
        };

        for (fragments, content_type) in CONTENT_RULES {
            if fragments.iter().any(|fragment| path.contains(fragment)) {
                return content_type;
            }
        }

        if path.is_empty() || path == "/" {
            ContentType::Homepage
        } else {
            ContentType::Other
        }
    }
}

/// Anything that can resolve a URL to its content type, caching as it goes.
pub trait ContentTypeLookup {
    fn lookup(&mut self, url: &str) -> ContentType;
}

/// Memo owned by a single analysis session.
#[derive(Debug, Default)]
pub struct ContentTypeCache {
    entries: HashMap<String, ContentType>,
}

impl ContentTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentTypeLookup for ContentTypeCache {
    fn lookup(&mut self, url: &str) -> ContentType {
        if let Some(content_type) = self.entries.get(url) {
            return *content_type;
        }
        let content_type = ContentTypeClassifier::classify(url);
        self.entries.insert(url.to_string(), content_type);
        content_type
    }
}

/// Memo shared across sessions and threads.
///
/// Cloning yields a handle to the same entries. An entry, once written, is
/// never replaced.
#[derive(Debug, Clone, Default)]
pub struct SharedContentTypeCache {
    entries: Arc<RwLock<HashMap<String, ContentType>>>,
}

impl SharedContentTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_classify(&self, url: &str) -> ContentType {
        if let Some(content_type) = self.entries.read().get(url) {
            return *content_type;
        }
        let content_type = ContentTypeClassifier::classify(url);
        *self
            .entries
            .write()
            .entry(url.to_string())
            .or_insert(content_type)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ContentTypeLookup for SharedContentTypeCache {
    fn lookup(&mut self, url: &str) -> ContentType {
        self.get_or_classify(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rules() {
        let cases = [
            ("https://site.com/blog/a", ContentType::Blog),
            ("https://site.com/en/news/today", ContentType::Blog),
            ("https://site.com/pricing", ContentType::Product),
            ("https://site.com/Shop/Item", ContentType::Product),
            ("https://site.com/help/reset", ContentType::Support),
            ("https://site.com/team", ContentType::About),
            ("https://site.com/account/settings", ContentType::Auth),
            ("https://site.com/", ContentType::Homepage),
            ("https://site.com", ContentType::Homepage),
            ("https://site.com/contact", ContentType::Other),
            ("", ContentType::Unknown),
            ("   ", ContentType::Unknown),
        ];
        for (url, expected) in cases {
            assert_eq!(ContentTypeClassifier::classify(url), expected, "url: {url}");
        }
    }

    #[test]
    fn test_classify_first_rule_wins() {
        // Both blog and product fragments are present; blog is checked first.
        assert_eq!(
            ContentTypeClassifier::classify("https://site.com/product/blog-post"),
            ContentType::Blog
        );
    }

    #[test]
    fn test_classify_ignores_host() {
        assert_eq!(
            ContentTypeClassifier::classify("https://news.example.com/contact"),
            ContentType::Other
        );
    }

    #[test]
    fn test_classify_bare_path() {
        assert_eq!(ContentTypeClassifier::classify("/faq"), ContentType::Support);
        assert_eq!(ContentTypeClassifier::classify("/"), ContentType::Homepage);
    }

    #[test]
    fn test_session_cache_memoizes() {
        let mut cache = ContentTypeCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("https://site.com/blog"), ContentType::Blog);
        assert_eq!(cache.lookup("https://site.com/blog"), ContentType::Blog);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_shared_cache_clones_share_entries() {
        let cache = SharedContentTypeCache::new();
        let mut handle = cache.clone();
        assert_eq!(handle.lookup("https://site.com/faq"), ContentType::Support);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_or_classify("https://site.com/faq"), ContentType::Support);
    }

    #[test]
    fn test_shared_cache_across_threads() {
        let cache = SharedContentTypeCache::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.get_or_classify(&format!("https://s.com/blog/{}", i % 2)))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), ContentType::Blog);
        }
        assert_eq!(cache.len(), 2);
    }
}
