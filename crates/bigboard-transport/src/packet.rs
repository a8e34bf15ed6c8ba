//! Interest and Data packets

use std::time::Duration;

use bigboard_core::{Exclude, Name};
use bytes::Bytes;

/// Default interest lifetime when none is set
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_secs(4);

/// Which child of the interest name the substrate should prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildSelector {
    /// Smallest remaining child in canonical order
    #[default]
    Lowest,
    /// Largest remaining child in canonical order
    Highest,
}

/// A named enumeration query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interest {
    name: Name,
    exclude: Exclude,
    selector: ChildSelector,
    lifetime: Duration,
    must_be_fresh: bool,
}

impl Interest {
    /// Create an interest for `name` with default selectors
    pub fn new(name: Name) -> Self {
        Interest {
            name,
            exclude: Exclude::new(),
            selector: ChildSelector::default(),
            lifetime: DEFAULT_INTEREST_LIFETIME,
            must_be_fresh: false,
        }
    }

    pub fn with_exclude(mut self, exclude: Exclude) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_selector(mut self, selector: ChildSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_must_be_fresh(mut self, must_be_fresh: bool) -> Self {
        self.must_be_fresh = must_be_fresh;
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn exclude(&self) -> &Exclude {
        &self.exclude
    }

    pub fn selector(&self) -> ChildSelector {
        self.selector
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn must_be_fresh(&self) -> bool {
        self.must_be_fresh
    }
}

/// A named answer carrying a payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Data {
    name: Name,
    content: Bytes,
    /// How long the substrate may treat this data as fresh (None = never fresh)
    freshness: Option<Duration>,
}

impl Data {
    pub fn new(name: Name, content: impl Into<Bytes>) -> Self {
        Data {
            name,
            content: content.into(),
            freshness: None,
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = Some(freshness);
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn freshness(&self) -> Option<Duration> {
        self.freshness
    }
}
