use std::fmt;

use crate::domain::Classification;
use crate::error::{AutosemverError, Result};

/// Semantic version triple derived from the commit history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version from a tag name.
    ///
    /// Accepts an optional `v`/`V` prefix and one to three dotted numeric
    /// components; missing components default to 0 (so `"v1.2"` parses as
    /// `(1, 2, 0)`). Anything else is a [AutosemverError::MalformedTag]
    /// error, which callers treat as fatal rather than as "untagged".
    pub fn parse(tag: &str) -> Result<Self> {
        let clean = tag
            .strip_prefix('v')
            .or_else(|| tag.strip_prefix('V'))
            .unwrap_or(tag);

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() > 3 {
            return Err(AutosemverError::malformed_tag(format!(
                "'{}' has more than three components",
                tag
            )));
        }

        let mut numbers = [0u64; 3];
        for (i, part) in parts.iter().enumerate() {
            numbers[i] = part.parse::<u64>().map_err(|_| {
                AutosemverError::malformed_tag(format!(
                    "'{}' has non-numeric component '{}'",
                    tag, part
                ))
            })?;
        }

        Ok(Version::new(numbers[0], numbers[1], numbers[2]))
    }

    /// Advance the version one step for a commit of the given kind.
    ///
    /// Exactly one component increases and the components to its right are
    /// zeroed.
    pub fn bump(&self, kind: Classification) -> Self {
        match kind {
            Classification::ApiBreak => Version::new(self.major + 1, 0, 0),
            Classification::Feature => Version::new(self.major, self.minor + 1, 0),
            Classification::Bug => Version::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_triple() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_without_prefix() {
        assert_eq!(Version::parse("1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_uppercase_prefix() {
        assert_eq!(Version::parse("V1.2.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_two_components_defaults_patch() {
        assert_eq!(Version::parse("2.3").unwrap(), Version::new(2, 3, 0));
    }

    #[test]
    fn test_parse_single_component() {
        assert_eq!(Version::parse("v4").unwrap(), Version::new(4, 0, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("v1.x").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_parse_error_is_malformed_tag() {
        let err = Version::parse("v1.x").unwrap_err();
        assert!(matches!(err, AutosemverError::MalformedTag(_)));
    }

    #[test]
    fn test_bump_api_break() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(Classification::ApiBreak), Version::new(2, 0, 0));
    }

    #[test]
    fn test_bump_feature() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(Classification::Feature), Version::new(1, 3, 0));
    }

    #[test]
    fn test_bump_bug() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(Classification::Bug), Version::new(1, 2, 4));
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
        assert_eq!(Version::default().to_string(), "0.0.0");
    }
}
