//! User-initiated handlers.
//!
//! Each handler writes the new setting first, then (if the client should be
//! running) applies it with a full restart.

use crate::core::exit_nodes::{self, ExitNodeOption};
use crate::core::PrefKey;
use crate::error::AppError;
use crate::remote::RemoteControl;

use super::logic;
use super::Reconciler;

impl<R: RemoteControl> Reconciler<R> {
    /// Master switch. On: restart with stored settings. Off: stop and reset
    /// the exit-node selection.
    pub async fn toggle_master(&self, on: bool) -> Result<(), AppError> {
        self.preferences().set(PrefKey::Toggle, &on)?;
        tracing::info!("Tailscale toggled: {on}");
        if on {
            self.restart("master switch on").await
        } else {
            self.shut_down().await
        }
    }

    /// Exit-node mode switch. Turning it off also clears the selected node.
    pub async fn set_exit_node_mode(&self, on: bool) -> Result<(), AppError> {
        self.preferences().set(PrefKey::ExitNode, &on)?;
        if !on {
            self.preferences().set(PrefKey::NodeIp, &"")?;
        }
        self.reconfigure(&format!("exit node toggled: {on}")).await
    }

    pub async fn set_allow_lan(&self, on: bool) -> Result<(), AppError> {
        self.preferences().set(PrefKey::AllowLan, &on)?;
        self.reconfigure(&format!("LAN access toggled: {on}")).await
    }

    /// Select a dropdown entry by label. The sentinel clears the selection;
    /// any real node also switches exit-node mode on.
    pub async fn select_exit_node(&self, label: &str) -> Result<(), AppError> {
        let node_ip = exit_nodes::node_ip_for_label(label);
        self.preferences().set(PrefKey::NodeIp, &node_ip)?;
        if logic::selection_enables_exit_node(&node_ip) {
            self.preferences().set(PrefKey::ExitNode, &true)?;
        }
        self.reconfigure(&format!("exit node IP set to: {label}"))
            .await
    }

    /// Refresh triggered by the user opening the dropdown.
    pub async fn open_exit_node_list(&self) -> Result<Vec<ExitNodeOption>, AppError> {
        self.refresh_exit_nodes().await
    }

    /// Store a proposed login server. Returns whether the stored value changed.
    ///
    /// Proposing the current value is a no-op; anything without a scheme
    /// separator is replaced by the default control-plane URL.
    pub fn set_login_server(&self, proposed: &str) -> Result<bool, AppError> {
        let current = self.preferences().snapshot().login_server;
        if proposed == current {
            return Ok(false);
        }
        let accepted = logic::validate_login_server(proposed);
        self.preferences().set(PrefKey::LoginServer, &accepted)?;
        tracing::info!("Login server set to {accepted}");
        Ok(accepted != current)
    }

    /// Confirm the login-server dialog: store, then restart if running and changed.
    pub async fn confirm_login_server(&self, proposed: &str) -> Result<(), AppError> {
        if self.set_login_server(proposed)? {
            self.reconfigure("login server change").await
        } else {
            Ok(())
        }
    }
}
