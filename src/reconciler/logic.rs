//! Pure decision functions used by the reconciler.
//!
//! These take plain values (no store, no remote) and can be unit-tested
//! without a runtime.

use crate::config;
use crate::core::PreferenceSnapshot;
use crate::remote::StartArgs;

/// Accept a proposed login server verbatim if it has a scheme separator,
/// otherwise substitute the default control-plane URL.
pub fn validate_login_server(proposed: &str) -> String {
    if proposed.contains(config::SCHEME_SEPARATOR) {
        proposed.to_string()
    } else {
        tracing::debug!("Rejected login server {proposed:?}, using default");
        config::DEFAULT_LOGIN_SERVER.to_string()
    }
}

/// Build `start` arguments from a fresh settings snapshot.
pub fn start_args(prefs: &PreferenceSnapshot) -> StartArgs {
    StartArgs {
        exit_node: prefs.exit_node,
        node_ip: prefs.node_ip.clone(),
        allow_lan: prefs.allow_lan,
        login_server: prefs.login_server.clone(),
    }
}

/// Whether selecting `node_ip` should switch exit-node mode on.
/// Clearing the selection leaves the mode flag alone.
pub fn selection_enables_exit_node(node_ip: &str) -> bool {
    !node_ip.is_empty()
}
