//! Client configuration

use std::time::Duration;

use bigboard_board::DEFAULT_FINGERPRINT_CAPACITY;
use bigboard_core::{BoardError, BoardResult, Name};
use bigboard_roster::{
    FetchConfig, RosterConfig, DEFAULT_DISCOVERY_LIFETIME, DEFAULT_EXPIRY_WINDOW,
    DEFAULT_FETCH_LIFETIME, DEFAULT_MESSAGES_PREFIX, DEFAULT_USERS_PREFIX,
};

/// Period of both beacon actions
pub const DEFAULT_BEACON_INTERVAL: Duration = Duration::from_millis(500);

/// BigBoard client configuration
#[derive(Clone, Debug)]
pub struct BoardConfig {
    /// Namespace runners announce themselves under
    pub users_prefix: Name,
    /// Namespace holding per-runner mailboxes
    pub messages_prefix: Name,
    /// Runners silent for longer than this are dropped
    pub expiry_window: Duration,
    pub discovery_lifetime: Duration,
    pub fetch_lifetime: Duration,
    /// Fetch tick period
    pub beacon_interval: Duration,
    /// Post tick period
    pub post_interval: Duration,
    /// Fingerprints remembered for duplicate suppression
    pub fingerprint_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            users_prefix: Name::from_path(DEFAULT_USERS_PREFIX),
            messages_prefix: Name::from_path(DEFAULT_MESSAGES_PREFIX),
            expiry_window: DEFAULT_EXPIRY_WINDOW,
            discovery_lifetime: DEFAULT_DISCOVERY_LIFETIME,
            fetch_lifetime: DEFAULT_FETCH_LIFETIME,
            beacon_interval: DEFAULT_BEACON_INTERVAL,
            post_interval: DEFAULT_BEACON_INTERVAL,
            fingerprint_capacity: DEFAULT_FINGERPRINT_CAPACITY,
        }
    }
}

impl BoardConfig {
    pub fn with_users_prefix(mut self, prefix: &str) -> BoardResult<Self> {
        self.users_prefix = prefix.parse()?;
        Ok(self)
    }

    pub fn with_messages_prefix(mut self, prefix: &str) -> BoardResult<Self> {
        self.messages_prefix = prefix.parse()?;
        Ok(self)
    }

    pub fn with_expiry_window(mut self, window: Duration) -> Self {
        self.expiry_window = window;
        self
    }

    pub fn with_discovery_lifetime(mut self, lifetime: Duration) -> Self {
        self.discovery_lifetime = lifetime;
        self
    }

    pub fn with_fetch_lifetime(mut self, lifetime: Duration) -> Self {
        self.fetch_lifetime = lifetime;
        self
    }

    pub fn with_beacon_interval(mut self, interval: Duration) -> Self {
        self.beacon_interval = interval;
        self
    }

    pub fn with_post_interval(mut self, interval: Duration) -> Self {
        self.post_interval = interval;
        self
    }

    pub fn with_fingerprint_capacity(mut self, capacity: usize) -> Self {
        self.fingerprint_capacity = capacity;
        self
    }

    /// Reject configurations the client cannot run with
    pub fn validate(&self) -> BoardResult<()> {
        let durations = [
            ("expiry_window", self.expiry_window),
            ("discovery_lifetime", self.discovery_lifetime),
            ("fetch_lifetime", self.fetch_lifetime),
            ("beacon_interval", self.beacon_interval),
            ("post_interval", self.post_interval),
        ];
        for (field, value) in durations {
            if value.is_zero() {
                return Err(BoardError::InvalidConfig(format!("{field} must be non-zero")));
            }
        }

        if self.fingerprint_capacity == 0 {
            return Err(BoardError::InvalidConfig(
                "fingerprint_capacity must be non-zero".into(),
            ));
        }

        if self.users_prefix.is_empty() || self.messages_prefix.is_empty() {
            return Err(BoardError::InvalidConfig("prefixes must not be the root name".into()));
        }
        if self.users_prefix.is_prefix_of(&self.messages_prefix)
            || self.messages_prefix.is_prefix_of(&self.users_prefix)
        {
            return Err(BoardError::InvalidConfig(format!(
                "users prefix {} and messages prefix {} overlap",
                self.users_prefix, self.messages_prefix
            )));
        }

        Ok(())
    }

    pub fn roster_config(&self) -> RosterConfig {
        RosterConfig {
            users_prefix: self.users_prefix.clone(),
            expiry_window: self.expiry_window,
            discovery_lifetime: self.discovery_lifetime,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            messages_prefix: self.messages_prefix.clone(),
            fetch_lifetime: self.fetch_lifetime,
        }
    }
}
