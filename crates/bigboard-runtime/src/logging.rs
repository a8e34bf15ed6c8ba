//! Logging setup
//!
//! Logs go to stderr so that board lines on stdout stay clean.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use bigboard_core::{BoardError, BoardResult};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "bigboard=info";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = BoardError;

    fn from_str(s: &str) -> BoardResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(BoardError::InvalidConfig(format!("unknown log format: {other}"))),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_logging(format: LogFormat, default_filter: &str) -> BoardResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| BoardError::InvalidConfig(format!("log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| BoardError::InvalidConfig(format!("logging already initialised: {e}")))
}
