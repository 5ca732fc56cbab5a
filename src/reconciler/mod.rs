//! State reconciler: keeps persisted settings, session state and the daemon in step.
//!
//! - `actions`: user-initiated handlers (toggles, exit-node selection, login server)
//! - `logic`: pure decision functions (unit-testable)
//! - `state`: session state, toggle phase and the presentation snapshot
//!
//! Every configuration change is applied as a full stop + start cycle. The
//! start arguments are always re-read from the store after `stop` returns,
//! so a poll tick or another handler that wrote in the meantime wins.

mod actions;
pub mod logic;
mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::exit_nodes::{self, ExitNodeOption};
use crate::core::{derive_view, DerivedView, DeviceStatusTable, PrefKey, Preferences};
use crate::error::AppError;
use crate::remote::{MullvadCatalog, RemoteControl};

pub use state::{PanelSnapshot, SessionState, TogglePhase};

pub struct Reconciler<R> {
    prefs: Preferences,
    remote: Arc<R>,
    session: Mutex<SessionState>,
}

impl<R: RemoteControl> Reconciler<R> {
    pub fn new(prefs: Preferences, remote: Arc<R>) -> Self {
        Self {
            prefs,
            remote,
            session: Mutex::new(SessionState::default()),
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    // The guard is never held across an `.await`.
    fn session(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> TogglePhase {
        self.session().phase.clone()
    }

    fn set_phase(&self, phase: TogglePhase) {
        let mut session = self.session();
        if session.phase != phase {
            tracing::debug!("Toggle phase {:?} -> {phase:?}", session.phase);
            session.phase = phase;
        }
    }

    /// Enablement flags recomputed from a fresh read of the store.
    pub fn view(&self) -> DerivedView {
        let prefs = self.prefs.snapshot();
        let list_fetched = self.session().list_fetched;
        derive_view(&prefs, list_fetched)
    }

    /// Everything the presentation layer needs, read fresh.
    pub fn snapshot(&self) -> PanelSnapshot {
        let preferences = self.prefs.snapshot();
        let session = self.session().clone();
        PanelSnapshot {
            view: derive_view(&preferences, session.list_fetched),
            preferences,
            phase: session.phase,
            device_status: session.device_status,
        }
    }

    // ---- Start / stop protocol ----

    /// Stop, then start with settings re-read from the store.
    ///
    /// A failed `stop` is logged and the start is attempted anyway, since
    /// `start` reconfigures whatever is running.
    async fn restart(&self, reason: &str) -> Result<(), AppError> {
        tracing::info!("Restarting Tailscale: {reason}");
        self.set_phase(TogglePhase::Stopping);
        if let Err(e) = self.remote.stop().await {
            tracing::warn!("Stop before restart failed: {e}");
        }
        self.start_fresh().await
    }

    /// Start with the five dependent settings read fresh from the store.
    async fn start_fresh(&self) -> Result<(), AppError> {
        let prefs = self.prefs.snapshot();
        if !prefs.toggle {
            // Toggled off while we were stopping; honour the latest intent.
            tracing::info!("Toggle is off, not starting");
            self.set_phase(TogglePhase::Stopped);
            return Ok(());
        }

        let args = logic::start_args(&prefs);
        {
            let mut session = self.session();
            session.phase = TogglePhase::Starting;
            session.list_fetched = false;
        }

        match self.remote.start(&args).await {
            Ok(verdict) => {
                tracing::info!(
                    "Tailscale up (verdict {verdict}) exit_node={} node_ip={:?} allow_lan={} login_server={}",
                    args.exit_node,
                    args.node_ip,
                    args.allow_lan,
                    args.login_server
                );
                self.set_phase(TogglePhase::Running);
                if let Err(e) = self.refresh_exit_nodes().await {
                    tracing::warn!("Exit node list refresh after start failed: {e}");
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Tailscale up failed: {e}");
                self.set_phase(TogglePhase::Degraded {
                    reason: e.to_string(),
                });
                self.sync_list_disabled()?;
                Err(e)
            }
        }
    }

    /// Stop and reset the exit-node selection. Mode and LAN flags are kept.
    async fn shut_down(&self) -> Result<(), AppError> {
        {
            let mut session = self.session();
            session.phase = TogglePhase::Stopping;
            session.list_fetched = false;
        }

        if let Err(e) = self.remote.stop().await {
            tracing::warn!("Tailscale down failed: {e}");
            self.set_phase(TogglePhase::Degraded {
                reason: e.to_string(),
            });
            self.sync_list_disabled()?;
            return Err(e);
        }

        self.prefs
            .set(PrefKey::ExitNodeList, &exit_nodes::sentinel_list())?;
        self.prefs.set(PrefKey::NodeIp, &"")?;
        self.prefs.set(PrefKey::ExitNodeListDisabled, &true)?;
        {
            let mut session = self.session();
            session.phase = TogglePhase::Stopped;
            session.device_status = DeviceStatusTable::default();
        }
        tracing::info!("Tailscale down");
        Ok(())
    }

    /// Restart only if the persisted toggle says the client should be running.
    async fn reconfigure(&self, reason: &str) -> Result<(), AppError> {
        if !self.prefs.get_present(PrefKey::Toggle, false) {
            tracing::debug!("Not running; stored without restart: {reason}");
            return Ok(());
        }
        self.restart(reason).await
    }

    // ---- Candidate list ----

    /// Rebuild the candidate list from a fresh query.
    ///
    /// On failure the stored list is left untouched. A result that arrives
    /// while the toggle is off or a stop is in flight is discarded.
    pub async fn refresh_exit_nodes(&self) -> Result<Vec<ExitNodeOption>, AppError> {
        let raw = self.remote.query_exit_node_candidates().await?;
        let list = exit_nodes::build_candidate_list(raw);

        let stopping = self.phase() == TogglePhase::Stopping;
        if stopping || !self.prefs.get_present(PrefKey::Toggle, false) {
            tracing::debug!("Discarding exit node list fetched while not running");
            return Ok(self
                .prefs
                .get_present(PrefKey::ExitNodeList, exit_nodes::sentinel_list()));
        }

        self.prefs.set(PrefKey::ExitNodeList, &list)?;
        self.session().list_fetched = true;
        self.sync_list_disabled()?;
        tracing::debug!("Exit node list: {} candidates", list.len() - 1);
        Ok(list)
    }

    /// Read-only pass-through of the Mullvad catalogue.
    pub async fn mullvad_exit_nodes(&self) -> Result<MullvadCatalog, AppError> {
        self.remote.query_mullvad_exit_nodes().await
    }

    // ---- Poll hooks ----

    pub async fn remote_running_state(&self) -> Result<bool, AppError> {
        self.remote.query_running_state().await
    }

    /// Fold an observed daemon running state into settings and phase.
    ///
    /// Ignored while a start or stop is in flight so a tick cannot undo an
    /// optimistic toggle write. An out-of-band start triggers a list refresh.
    pub async fn observe_running_state(&self, running: bool) -> Result<(), AppError> {
        let previous = {
            let mut session = self.session();
            if !session.phase.is_settled() {
                tracing::debug!("Skipping poll result during {:?}", session.phase);
                return Ok(());
            }
            let previous = session.phase.clone();
            if running {
                session.phase = TogglePhase::Running;
            } else {
                session.list_fetched = false;
                session.device_status = DeviceStatusTable::default();
                if previous.is_running() {
                    session.phase = TogglePhase::Stopped;
                }
            }
            previous
        };

        if self.prefs.get_present(PrefKey::Toggle, false) != running {
            tracing::info!("Daemon reports running={running}, updating toggle");
            self.prefs.set(PrefKey::Toggle, &running)?;
        }

        if running && !previous.is_running() {
            tracing::info!("Tailscale came up outside the panel");
            if let Err(e) = self.refresh_exit_nodes().await {
                tracing::debug!("Exit node list refresh failed: {e}");
            }
        }
        Ok(())
    }

    /// Redraw the device table from a fresh query.
    ///
    /// A ragged response keeps the previous table.
    pub async fn refresh_device_status(&self) -> Result<(), AppError> {
        let columns = self.remote.query_device_status().await?;
        let table = DeviceStatusTable::from_columns(&columns)?;
        self.session().device_status = table;
        Ok(())
    }

    /// Persist the derived list-disabled flag when it differs from the stored one.
    pub fn sync_list_disabled(&self) -> Result<bool, AppError> {
        let disabled = self.view().exit_node_list_disabled;
        if self.prefs.get_present(PrefKey::ExitNodeListDisabled, true) != disabled {
            self.prefs.set(PrefKey::ExitNodeListDisabled, &disabled)?;
        }
        Ok(disabled)
    }
}
