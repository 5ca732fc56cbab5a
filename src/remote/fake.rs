//! Scripted in-process [`RemoteControl`] used by unit tests.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;

use super::{MullvadCatalog, RemoteControl, StartArgs};
use crate::core::StatusColumns;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Start(StartArgs),
    Stop,
    QueryRunning,
    QueryDevices,
    QueryCandidates,
    QueryMullvad,
}

pub(crate) struct Script {
    pub running: bool,
    pub start_ok: bool,
    pub stop_ok: bool,
    pub query_ok: bool,
    pub candidates: Vec<Option<String>>,
    /// One-shot delay applied to the next running-state query.
    pub stall: Option<Duration>,
    pub devices: StatusColumns,
    pub calls: Vec<Call>,
}

impl Default for Script {
    fn default() -> Self {
        let mut devices = StatusColumns::new();
        devices.insert("name".into(), vec![json!("steamdeck"), json!("nas")]);
        devices.insert("status".into(), vec![json!("-"), json!("offline")]);
        Self {
            running: false,
            start_ok: true,
            stop_ok: true,
            query_ok: true,
            candidates: Vec::new(),
            stall: None,
            devices,
            calls: Vec::new(),
        }
    }
}

/// Behaves like a cooperative daemon: `start` marks it running, `stop` stops it.
#[derive(Default)]
pub(crate) struct FakeRemote {
    pub script: Mutex<Script>,
}

impl FakeRemote {
    pub fn with(edit: impl FnOnce(&mut Script)) -> Self {
        let fake = Self::default();
        edit(&mut fake.script.lock().unwrap());
        fake
    }

    pub fn edit(&self, edit: impl FnOnce(&mut Script)) {
        edit(&mut self.script.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn starts(&self) -> Vec<StartArgs> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(args) => Some(args),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.script.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, Script> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        script
    }
}

fn refused(what: &str) -> AppError {
    AppError::Remote(format!("{what} returned success=false"))
}

impl RemoteControl for FakeRemote {
    async fn start(&self, args: &StartArgs) -> Result<bool, AppError> {
        let mut script = self.record(Call::Start(args.clone()));
        if !script.start_ok {
            return Err(refused("up"));
        }
        script.running = true;
        Ok(true)
    }

    async fn stop(&self) -> Result<(), AppError> {
        let mut script = self.record(Call::Stop);
        if !script.stop_ok {
            return Err(refused("down"));
        }
        script.running = false;
        Ok(())
    }

    async fn query_running_state(&self) -> Result<bool, AppError> {
        let stall = self.record(Call::QueryRunning).stall.take();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        let script = self.script.lock().unwrap();
        if !script.query_ok {
            return Err(refused("get_tailscale_state"));
        }
        Ok(script.running)
    }

    async fn query_device_status(&self) -> Result<StatusColumns, AppError> {
        let script = self.record(Call::QueryDevices);
        if !script.query_ok {
            return Err(refused("get_tailscale_device_status"));
        }
        Ok(script.devices.clone())
    }

    async fn query_exit_node_candidates(&self) -> Result<Vec<Option<String>>, AppError> {
        let script = self.record(Call::QueryCandidates);
        if !script.query_ok {
            return Err(refused("get_tailscale_exit_node_ip_list"));
        }
        Ok(script.candidates.clone())
    }

    async fn query_mullvad_exit_nodes(&self) -> Result<MullvadCatalog, AppError> {
        let script = self.record(Call::QueryMullvad);
        if !script.query_ok {
            return Err(refused("get_tailscale_mullvad_ip_list"));
        }
        Ok(MullvadCatalog::new())
    }
}
