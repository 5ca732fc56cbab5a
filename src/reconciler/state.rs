//! In-memory session state and the snapshot handed to the presentation layer.

use serde::Serialize;

use crate::core::{DerivedView, DeviceStatusTable, PreferenceSnapshot};

/// Where the master toggle is in its start/stop cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TogglePhase {
    Stopped,
    Starting,
    Running,
    Stopping,
    /// The last start or stop failed; settings were kept as the user left them.
    Degraded { reason: String },
}

impl TogglePhase {
    /// No start or stop is in flight.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Starting | Self::Stopping)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Facts that only live for the lifetime of the component.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: TogglePhase,
    /// A candidate-list query succeeded since the last start.
    pub list_fetched: bool,
    pub device_status: DeviceStatusTable,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: TogglePhase::Stopped,
            list_fetched: false,
            device_status: DeviceStatusTable::default(),
        }
    }
}

/// Everything the view layer renders.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub preferences: PreferenceSnapshot,
    pub view: DerivedView,
    pub phase: TogglePhase,
    pub device_status: DeviceStatusTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitional_phases_are_not_settled() {
        assert!(TogglePhase::Stopped.is_settled());
        assert!(TogglePhase::Running.is_settled());
        assert!(TogglePhase::Degraded { reason: "x".into() }.is_settled());
        assert!(!TogglePhase::Starting.is_settled());
        assert!(!TogglePhase::Stopping.is_settled());
    }

    #[test]
    fn test_phase_serializes_with_state_tag() {
        let json = serde_json::to_value(TogglePhase::Degraded {
            reason: "up returned success=false".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "degraded");
        assert_eq!(json["reason"], "up returned success=false");
        assert_eq!(
            serde_json::to_value(TogglePhase::Running).unwrap(),
            serde_json::json!({ "state": "running" })
        );
    }
}
