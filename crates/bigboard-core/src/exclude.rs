//! Exclusion filters for enumeration queries
//!
//! An enumeration query names a prefix and carries the set of child
//! components the client has already seen. The substrate answers with a
//! child outside that set, so each round trip yields something new.

use std::collections::BTreeSet;
use std::fmt;

use crate::Component;

/// Monotonically extended set of already-seen child components
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Exclude {
    components: BTreeSet<Component>,
}

impl Exclude {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new filter that also excludes `component`
    #[must_use]
    pub fn extend(&self, component: Component) -> Self {
        let mut next = self.clone();
        next.components.insert(component);
        next
    }

    /// Check whether a component is excluded
    pub fn contains(&self, component: &Component) -> bool {
        self.components.contains(component)
    }

    /// True if every component excluded by `self` is excluded by `other`
    pub fn is_subset(&self, other: &Exclude) -> bool {
        self.components.is_subset(&other.components)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Excluded components in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }
}

impl FromIterator<Component> for Exclude {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Exclude {
            components: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Exclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.components.iter().map(|c| c.as_str())).finish()
    }
}
