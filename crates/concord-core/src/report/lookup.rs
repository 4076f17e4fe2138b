use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ConcordError;

/// Text shown when a key has no known title.
pub const TITLE_NOT_FOUND: &str = "Title not found";

/// Source of human-readable titles for product keys.
///
/// Implementations may hit the network; failures are reported as
/// `ConcordError::Lookup` and degrade to a placeholder in reports.
pub trait TitleLookup {
    fn lookup_title(&self, key: &str) -> Result<Option<String>, ConcordError>;
}

/// Lookup that knows no titles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl TitleLookup for NoLookup {
    fn lookup_title(&self, _key: &str) -> Result<Option<String>, ConcordError> {
        Ok(None)
    }
}

/// Titles from a local JSON catalog: `{"9780134685991": "Effective Java"}`.
#[derive(Debug, Clone, Default)]
pub struct CatalogLookup {
    titles: HashMap<String, String>,
}

impl CatalogLookup {
    pub fn new(titles: HashMap<String, String>) -> Self {
        let titles = titles
            .into_iter()
            .filter_map(|(k, v)| crate::key::normalize(&k).map(|k| (k, v)))
            .collect();
        Self { titles }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConcordError> {
        let titles: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::new(titles))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConcordError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConcordError::Lookup(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json_str(&json)?;
        debug!(path = %path.display(), titles = catalog.len(), "loaded title catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl TitleLookup for CatalogLookup {
    fn lookup_title(&self, key: &str) -> Result<Option<String>, ConcordError> {
        Ok(self.titles.get(key).cloned())
    }
}

/// Title for `key`, or the placeholder when none is known or lookup fails.
pub fn resolve_title(lookup: &dyn TitleLookup, key: &str) -> String {
    match lookup.lookup_title(key) {
        Ok(Some(title)) if !title.trim().is_empty() => title,
        Ok(_) => TITLE_NOT_FOUND.to_string(),
        Err(e) => {
            warn!(key, error = %e, "title lookup failed");
            TITLE_NOT_FOUND.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingLookup;

    impl TitleLookup for FailingLookup {
        fn lookup_title(&self, _key: &str) -> Result<Option<String>, ConcordError> {
            Err(ConcordError::Lookup("service unavailable".into()))
        }
    }

    #[test]
    fn test_catalog_normalizes_keys() {
        let catalog =
            CatalogLookup::from_json_str(r#"{"978-0-13-468599-1": "Effective Java", "bad": "x"}"#)
                .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(resolve_title(&catalog, "9780134685991"), "Effective Java");
    }

    #[test]
    fn test_missing_title_uses_placeholder() {
        assert_eq!(resolve_title(&NoLookup, "9780134685991"), TITLE_NOT_FOUND);
    }

    #[test]
    fn test_failed_lookup_degrades() {
        assert_eq!(resolve_title(&FailingLookup, "9780134685991"), TITLE_NOT_FOUND);
    }

    #[test]
    fn test_invalid_catalog_json() {
        assert!(matches!(
            CatalogLookup::from_json_str("[1, 2]"),
            Err(ConcordError::Json(_))
        ));
    }
}
