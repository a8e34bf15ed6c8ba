//! Roster and fetcher configuration

use std::time::Duration;

use bigboard_core::Name;

/// How long a runner stays on the roster without a fresh announcement
pub const DEFAULT_EXPIRY_WINDOW: Duration = Duration::from_secs(60);

/// Lifetime of a discovery interest before it is reissued
pub const DEFAULT_DISCOVERY_LIFETIME: Duration = Duration::from_secs(5);

/// Lifetime of a message interest; a timeout ends the fetch chain
pub const DEFAULT_FETCH_LIFETIME: Duration = Duration::from_millis(500);

/// Discovery sweeps started per expiry window, so a live runner is
/// reported several times before it could be expired
pub const SWEEPS_PER_WINDOW: u32 = 4;

pub const DEFAULT_USERS_PREFIX: &str = "/users";
pub const DEFAULT_MESSAGES_PREFIX: &str = "/messages";

/// Roster manager configuration
#[derive(Clone, Debug)]
pub struct RosterConfig {
    /// Namespace runners announce themselves under
    pub users_prefix: Name,
    pub expiry_window: Duration,
    pub discovery_lifetime: Duration,
}

impl Default for RosterConfig {
    fn default() -> Self {
        RosterConfig {
            users_prefix: Name::from_path(DEFAULT_USERS_PREFIX),
            expiry_window: DEFAULT_EXPIRY_WINDOW,
            discovery_lifetime: DEFAULT_DISCOVERY_LIFETIME,
        }
    }
}

impl RosterConfig {
    /// Minimum age of a discovery sweep before an empty round ends it
    pub fn sweep_interval(&self) -> Duration {
        (self.expiry_window / SWEEPS_PER_WINDOW).max(Duration::from_millis(1))
    }
}

/// Message fetcher configuration
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Namespace holding `<prefix>/<runner>/<sequence>` messages
    pub messages_prefix: Name,
    pub fetch_lifetime: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            messages_prefix: Name::from_path(DEFAULT_MESSAGES_PREFIX),
            fetch_lifetime: DEFAULT_FETCH_LIFETIME,
        }
    }
}
