//! Derived enablement flags.
//!
//! Nothing here is stored: the view is recomputed from a fresh
//! [`PreferenceSnapshot`] every time the presentation layer asks.

use serde::Serialize;

use crate::core::exit_nodes::selected_option_id;
use crate::core::preferences::PreferenceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedView {
    /// The exit-node dropdown is greyed out.
    pub exit_node_list_disabled: bool,
    /// The exit-node mode switch accepts input.
    pub exit_node_toggle_enabled: bool,
    /// The allow-LAN switch accepts input. Only exposed once an exit node is selectable.
    pub allow_lan_enabled: bool,
    /// Dropdown entry matching the stored node IP (sentinel when none).
    pub selected_option: u32,
}

/// Compute the view from settings plus whether the candidate list has been
/// fetched successfully since the last start.
pub fn derive_view(prefs: &PreferenceSnapshot, list_fetched: bool) -> DerivedView {
    let exit_node_list_disabled = !(prefs.toggle && list_fetched);
    DerivedView {
        exit_node_list_disabled,
        exit_node_toggle_enabled: !exit_node_list_disabled,
        allow_lan_enabled: prefs.exit_node && !exit_node_list_disabled,
        selected_option: selected_option_id(&prefs.exit_node_list, &prefs.node_ip),
    }
}
