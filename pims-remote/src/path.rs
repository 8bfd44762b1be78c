use core::fmt::{self, Display};

use crate::result::{Error, Result};

/// A location in the tree, e.g. `participants/participant_1/name`.
///
/// The root is the empty path. Every segment is a valid key (see [`is_valid_key`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

/// Keys may not be empty and may not contain `.`, `$`, `#`, `[`, `]`, `/` or control characters.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| matches!(c, '.' | '$' | '#' | '[' | ']' | '/') || c.is_control())
}

impl Path {
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// A single segment path for a key known at compile time, such as a collection name.
    #[must_use]
    pub fn single(key: &'static str) -> Self {
        debug_assert!(is_valid_key(key), "invalid static key {key:?}");
        Self {
            segments: vec![key.to_owned()],
        }
    }

    /// Parses a slash separated path. Leading and trailing slashes are ignored, so `""` and `"/"`
    /// are the root.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split('/')
            .map(|segment| {
                if is_valid_key(segment) {
                    Ok(segment.to_owned())
                } else {
                    Err(Error::InvalidPath(path.to_owned()))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn child(&self, key: &str) -> Result<Self> {
        if !is_valid_key(key) {
            return Err(Error::InvalidKey(key.to_owned()));
        }
        let mut segments = self.segments.clone();
        segments.push(key.to_owned());
        Ok(Self { segments })
    }

    #[must_use]
    pub fn join(&self, relative: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Inclusive: a path is an ancestor of itself.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// The key of the direct child of `self` that contains `descendant`, if `descendant` lies
    /// strictly below `self`.
    #[must_use]
    pub fn child_towards<'a>(&self, descendant: &'a Self) -> Option<&'a str> {
        if descendant.segments.len() > self.segments.len() && self.is_ancestor_of(descendant) {
            Some(descendant.segments[self.segments.len()].as_str())
        } else {
            None
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let path = Path::parse("/participants/p1/").unwrap();
        assert_eq!(path.segments(), ["participants", "p1"]);
        assert_eq!(path.to_string(), "/participants/p1");
        assert!(Path::parse("").unwrap().is_root());
        assert_eq!(Path::root().to_string(), "/");
    }

    #[test]
    fn rejects_forbidden_characters() {
        assert!(matches!(
            Path::parse("participants/a.b"),
            Err(Error::InvalidPath(_))
        ));
        assert!(Path::parse("a//b").is_err());
        assert!(matches!(
            Path::root().child("x#1"),
            Err(Error::InvalidKey(_))
        ));
        assert!(Path::root().child("").is_err());
    }

    #[test]
    fn ancestry() {
        let collection = Path::single("events");
        let record = collection.child("e1").unwrap();
        let field = record.child("title").unwrap();

        assert!(collection.is_ancestor_of(&collection));
        assert!(collection.is_ancestor_of(&field));
        assert!(!field.is_ancestor_of(&collection));
        assert!(Path::root().is_ancestor_of(&field));

        assert_eq!(collection.child_towards(&field), Some("e1"));
        assert_eq!(collection.child_towards(&collection), None);
        assert_eq!(
            Path::single("users").child_towards(&field),
            None,
            "unrelated paths have no child in between"
        );
    }
}
