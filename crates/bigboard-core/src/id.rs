//! Identity types for BigBoard
//!
//! Runner ids and message sequences are opaque strings chosen by producers.
//! Both travel as a single name component.

use std::fmt;

use crate::{BoardResult, Component};

/// Participant identifier
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunnerId(Component);

impl RunnerId {
    pub fn new(id: impl Into<String>) -> BoardResult<Self> {
        Ok(RunnerId(Component::new(id)?))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[inline]
    pub fn as_component(&self) -> &Component {
        &self.0
    }
}

impl From<Component> for RunnerId {
    fn from(component: Component) -> Self {
        RunnerId(component)
    }
}

impl fmt::Debug for RunnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runner({})", self.0)
    }
}

impl fmt::Display for RunnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Producer-assigned message sequence marker.
/// Used for exclusion only, never for ordering.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Sequence(Component);

impl Sequence {
    pub fn new(seq: impl Into<String>) -> BoardResult<Self> {
        Ok(Sequence(Component::new(seq)?))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[inline]
    pub fn as_component(&self) -> &Component {
        &self.0
    }
}

impl From<Component> for Sequence {
    fn from(component: Component) -> Self {
        Sequence(component)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seq({})", self.0)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_id_component_roundtrip() {
        let id = RunnerId::new("alice").unwrap();
        let component = id.as_component().clone();
        assert_eq!(component.as_str(), "alice");
        assert_eq!(RunnerId::from(component), id);
    }

    #[test]
    fn test_invalid_ids() {
        assert!(RunnerId::new("a/b").is_err());
        assert!(Sequence::new("1/2").is_err());
    }
}
