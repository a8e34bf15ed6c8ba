//! Hierarchical names
//!
//! A name is a sequence of components written `/users/alice/1700000000000`.
//! Components compare in canonical order: shorter first, then bytewise.
//! Child selectors and exclusion filters both rely on that order, which is
//! why sequence `"10"` sorts after `"9"`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{BoardError, BoardResult};

/// A single name component
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Component(String);

impl Component {
    /// Create a component. Slashes are not allowed inside a component.
    pub fn new(value: impl Into<String>) -> BoardResult<Self> {
        let value = value.into();
        if value.contains('/') {
            return Err(BoardError::InvalidName(format!(
                "component contains '/': {value}"
            )));
        }
        Ok(Component(value))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.as_bytes().cmp(other.0.as_bytes()))
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({:?})", self.0)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A hierarchical name
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// Build a name from a slash-separated path. Unlike `FromStr`, the
    /// leading '/' is optional.
    pub fn from_path(path: &str) -> Self {
        let components = path
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| Component(c.to_string()))
            .collect();
        Name { components }
    }

    /// Append a component, consuming self
    pub fn append(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Append a string component, consuming self
    pub fn append_str(self, value: &str) -> BoardResult<Self> {
        Ok(self.append(Component::new(value)?))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// True if every component of `self` is a leading component of `other`
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.components.len() <= other.components.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }

    /// The component of `other` immediately following `self`, if `self` is a
    /// proper prefix of `other`
    pub fn child_of<'a>(&self, other: &'a Name) -> Option<&'a Component> {
        if self.is_prefix_of(other) {
            other.get(self.len())
        } else {
            None
        }
    }
}

impl FromStr for Name {
    type Err = BoardError;

    fn from_str(s: &str) -> BoardResult<Self> {
        if !s.starts_with('/') {
            return Err(BoardError::InvalidName(format!("name must start with '/': {s}")));
        }
        Ok(Name::from_path(s))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for c in &self.components {
            write!(f, "/{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Component {
        Component::new(s).unwrap()
    }

    #[test]
    fn test_canonical_component_order() {
        assert!(c("9") < c("10"));
        assert!(c("a") < c("b"));
        assert!(c("zz") < c("aaa"));
        assert!(c("") < c("0"));
    }

    #[test]
    fn test_component_rejects_slash() {
        assert!(Component::new("a/b").is_err());
    }

    #[test]
    fn test_name_parse_and_display() {
        let name: Name = "/messages/alice/1".parse().unwrap();
        assert_eq!(name.len(), 3);
        assert_eq!(name.get(1).unwrap().as_str(), "alice");
        assert_eq!(name.to_string(), "/messages/alice/1");

        let root: Name = "/".parse().unwrap();
        assert!(root.is_empty());
        assert_eq!(root.to_string(), "/");

        assert!("users".parse::<Name>().is_err());
        assert_eq!(Name::from_path("users//alice/"), "/users/alice".parse::<Name>().unwrap());
    }

    #[test]
    fn test_prefix_and_child() {
        let prefix: Name = "/users".parse().unwrap();
        let full: Name = "/users/alice/123".parse().unwrap();
        let other: Name = "/messages/alice".parse().unwrap();

        assert!(prefix.is_prefix_of(&full));
        assert!(!prefix.is_prefix_of(&other));
        assert_eq!(prefix.child_of(&full), Some(&c("alice")));
        assert_eq!(prefix.child_of(&prefix), None);
        assert_eq!(prefix.child_of(&other), None);
    }
}
