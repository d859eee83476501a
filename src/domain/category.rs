use std::fmt;
use std::hash::{Hash, Hasher};

/// The natural key of an arXiv category: an archive (e.g. "cs") plus an
/// optional subcategory (e.g. "CV" for "cs.CV").
///
/// An absent subcategory is a distinct key value, never a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryIdentifier {
    pub archive: String,
    pub subcategory: Option<String>,
}

impl CategoryIdentifier {
    pub fn new(archive: impl Into<String>, subcategory: Option<String>) -> Self {
        Self {
            archive: archive.into(),
            subcategory,
        }
    }

    /// Parses the canonical `"archive"` / `"archive.subcategory"` form.
    /// Only the first two dot-separated parts are significant.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split('.');
        let archive = parts.next().unwrap_or_default().to_string();
        let subcategory = parts.next().map(str::to_string);
        Self {
            archive,
            subcategory,
        }
    }

    /// True when the identifier denotes a whole archive (no subcategory).
    pub fn is_archive(&self) -> bool {
        self.subcategory.is_none()
    }
}

impl fmt::Display for CategoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subcategory {
            Some(sub) => write!(f, "{}.{}", self.archive, sub),
            None => write!(f, "{}", self.archive),
        }
    }
}

/// An arXiv category. Identity is defined solely by `identifier`; the
/// descriptive fields are metadata that may be enriched later without
/// affecting set or map membership.
#[derive(Debug, Clone, Eq)]
pub struct Category {
    pub identifier: CategoryIdentifier,
    pub archive_name: Option<String>,
    pub category_name: Option<String>,
    pub description: Option<String>,
}

impl Category {
    /// A category known only by its identifier, with no metadata yet.
    pub fn new(identifier: CategoryIdentifier) -> Self {
        Self {
            identifier,
            archive_name: None,
            category_name: None,
            description: None,
        }
    }

    pub fn parse(s: &str) -> Self {
        Self::new(CategoryIdentifier::parse(s))
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifier_round_trips_through_canonical_form() {
        for s in ["cs", "cs.CV", "astro-ph", "astro-ph.SR", "math-ph"] {
            assert_eq!(CategoryIdentifier::parse(s).to_string(), s);
        }
    }

    #[test]
    fn parse_keeps_only_two_parts() {
        let id = CategoryIdentifier::parse("cs.CV.extra");
        assert_eq!(id.archive, "cs");
        assert_eq!(id.subcategory.as_deref(), Some("CV"));
    }

    #[test]
    fn archive_only_identifier_has_no_subcategory() {
        let id = CategoryIdentifier::parse("hep-th");
        assert!(id.is_archive());
        assert_eq!(id.archive, "hep-th");
    }

    #[test]
    fn category_identity_ignores_metadata() {
        let bare = Category::parse("cs.CV");
        let enriched = Category {
            identifier: CategoryIdentifier::parse("cs.CV"),
            archive_name: Some("Computer Science".into()),
            category_name: Some("Computer Vision and Pattern Recognition".into()),
            description: Some("Covers image processing...".into()),
        };
        assert_eq!(bare, enriched);

        let mut set = HashSet::new();
        set.insert(bare);
        set.insert(enriched);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn categories_with_different_identifiers_differ() {
        assert_ne!(Category::parse("cs"), Category::parse("cs.CV"));
        assert_ne!(Category::parse("cs.CV"), Category::parse("cs.CL"));
    }
}
