//! Centralized runtime constants.
//!
//! Intervals, defaults and fixed labels live here so they can be found and
//! adjusted in one place rather than scattered across modules.

/// Interval at which the poller queries daemon state (seconds).
pub const POLL_INTERVAL_SECS: u64 = 1;

/// Control-plane URL used when none is stored or the proposed one is invalid.
pub const DEFAULT_LOGIN_SERVER: &str = "https://controlplane.tailscale.com";

/// A login-server URL must contain this to be accepted.
pub const SCHEME_SEPARATOR: &str = "://";

/// Label of the always-present first entry of the exit-node candidate list.
pub const SENTINEL_LABEL: &str = "Unset";

/// Id of the sentinel entry.
pub const SENTINEL_ID: u32 = 0;

/// File name of the SQLite preference database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "tailscale-control.db";

/// Default filter for the tracing subscriber when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "tailscale_control=info";
