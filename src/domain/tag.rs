use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Prefix carried by every version tag
pub const TAG_PREFIX: &str = "v";

/// A tag name bound to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    /// Commit hash (annotated tags already peeled)
    pub sha: String,
}

impl TagRef {
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        TagRef {
            name: name.into(),
            sha: sha.into(),
        }
    }
}

/// Which version tags a lookup accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPattern {
    /// Exactly `vMAJOR.MINOR.PATCH`
    Stable,
    /// `vMAJOR.MINOR.PATCH` followed by anything
    Any,
}

fn stable_regex() -> Option<&'static Regex> {
    static STABLE: OnceLock<Option<Regex>> = OnceLock::new();
    STABLE
        .get_or_init(|| Regex::new(r"^v\d+\.\d+\.\d+$").ok())
        .as_ref()
}

fn any_regex() -> Option<&'static Regex> {
    static ANY: OnceLock<Option<Regex>> = OnceLock::new();
    ANY.get_or_init(|| Regex::new(r"^v\d+\.\d+\.\d+").ok())
        .as_ref()
}

impl TagPattern {
    pub fn from_stable_only(stable_only: bool) -> Self {
        if stable_only {
            TagPattern::Stable
        } else {
            TagPattern::Any
        }
    }

    /// Validate if a tag name matches this pattern
    pub fn matches(&self, tag: &str) -> bool {
        let re = match self {
            TagPattern::Stable => stable_regex(),
            TagPattern::Any => any_regex(),
        };
        re.map(|re| re.is_match(tag)).unwrap_or(false)
    }

    /// First tag in `tags` matching this pattern.
    ///
    /// Order is the caller's; no version comparison happens here.
    pub fn first_match<'a, I>(&self, tags: I) -> Option<&'a TagRef>
    where
        I: IntoIterator<Item = &'a TagRef>,
    {
        tags.into_iter().find(|tag| self.matches(&tag.name))
    }
}

/// Strip the leading `v` from a tag name ("v1.2.3" -> "1.2.3")
pub fn normalize_tag(tag: &str) -> &str {
    tag.strip_prefix(TAG_PREFIX).unwrap_or(tag)
}

/// Format a tag name from a version string ("1.2.3" -> "v1.2.3")
pub fn tag_for_version(version: &str) -> String {
    format!("{}{}", TAG_PREFIX, version)
}

/// Order tags newest version first.
///
/// Tags that do not parse as versions sort after every version tag.
pub fn sort_newest_first(tags: &mut [TagRef]) {
    tags.sort_by(|a, b| {
        let parse = |tag: &TagRef| semver::Version::parse(normalize_tag(&tag.name)).ok();
        match (parse(a), parse(b)) {
            (Some(va), Some(vb)) => vb.cmp(&va),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.name.cmp(&a.name),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("v1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("v1.2.3-dev.1"), "1.2.3-dev.1");
    }

    #[test]
    fn test_normalize_then_prefix_round_trips() {
        for tag in ["v0.0.1", "v1.2.3", "v10.20.30-next.4"] {
            assert_eq!(tag_for_version(normalize_tag(tag)), tag);
        }
    }

    #[test]
    fn test_stable_pattern() {
        let pattern = TagPattern::Stable;
        assert!(pattern.matches("v1.2.3"));
        assert!(!pattern.matches("v1.2.3-dev.1"));
        assert!(!pattern.matches("1.2.3"));
        assert!(!pattern.matches("release-1.2.3"));
    }

    #[test]
    fn test_any_pattern() {
        let pattern = TagPattern::Any;
        assert!(pattern.matches("v1.2.3"));
        assert!(pattern.matches("v1.2.3-dev.1"));
        assert!(pattern.matches("v1.2.3-anything"));
        assert!(!pattern.matches("v1.2"));
    }

    #[test]
    fn test_first_match_respects_order() {
        let tags = vec![
            TagRef::new("nightly", "a"),
            TagRef::new("v1.1.0-dev.2", "b"),
            TagRef::new("v1.0.0", "c"),
        ];
        assert_eq!(
            TagPattern::Any.first_match(&tags).map(|t| t.name.as_str()),
            Some("v1.1.0-dev.2")
        );
        assert_eq!(
            TagPattern::Stable.first_match(&tags).map(|t| t.name.as_str()),
            Some("v1.0.0")
        );
        assert_eq!(TagPattern::Stable.first_match(&tags[..2]), None);
    }

    #[test]
    fn test_from_stable_only() {
        assert_eq!(TagPattern::from_stable_only(true), TagPattern::Stable);
        assert_eq!(TagPattern::from_stable_only(false), TagPattern::Any);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut tags = vec![
            TagRef::new("v1.9.0", "a"),
            TagRef::new("nightly", "b"),
            TagRef::new("v1.10.0-dev.2", "c"),
            TagRef::new("v1.10.0", "d"),
            TagRef::new("v1.10.0-dev.10", "e"),
        ];
        sort_newest_first(&mut tags);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["v1.10.0", "v1.10.0-dev.10", "v1.10.0-dev.2", "v1.9.0", "nightly"]
        );
    }
}
