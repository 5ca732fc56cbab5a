//! Remote control boundary to the daemon-management service.
//!
//! [`RemoteControl`] is the seam the reconciler and poller are generic over.
//! Every operation maps to one named plugin method whose reply is a
//! `{ "success": bool, "result": T }` envelope; [`Reply::into_result`] turns
//! that envelope into a `Result`. Nothing here retries.

mod bridge;
#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::StatusColumns;
use crate::error::AppError;

pub use bridge::PluginBridge;

/// Named plugin methods exposed by the daemon-management service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Up,
    Down,
    State,
    DeviceStatus,
    ExitNodeList,
    MullvadList,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Up => "up",
            Method::Down => "down",
            Method::State => "get_tailscale_state",
            Method::DeviceStatus => "get_tailscale_device_status",
            Method::ExitNodeList => "get_tailscale_exit_node_ip_list",
            Method::MullvadList => "get_tailscale_mullvad_ip_list",
        }
    }
}

/// Arguments of a full reconfigure-and-start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartArgs {
    pub exit_node: bool,
    pub node_ip: String,
    #[serde(rename = "allow_lan_access")]
    pub allow_lan: bool,
    pub login_server: String,
}

/// A Mullvad exit node offered through the tailnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MullvadNode {
    pub ip: String,
    pub host: String,
    pub city: String,
}

/// Country → online Mullvad nodes in that country.
pub type MullvadCatalog = IndexMap<String, Vec<MullvadNode>>;

/// Reply envelope returned for every method call.
#[derive(Debug, Deserialize)]
pub struct Reply<T> {
    pub success: bool,
    pub result: Option<T>,
}

impl<T> Reply<T> {
    /// Unwrap a reply whose result is required.
    pub fn into_result(self, method: Method) -> Result<T, AppError> {
        if !self.success {
            return Err(AppError::Remote(format!(
                "{} returned success=false",
                method.as_str()
            )));
        }
        self.result
            .ok_or_else(|| AppError::Remote(format!("{} returned no result", method.as_str())))
    }

    /// Check only the success flag.
    pub fn into_ack(self, method: Method) -> Result<(), AppError> {
        if self.success {
            Ok(())
        } else {
            Err(AppError::Remote(format!(
                "{} returned success=false",
                method.as_str()
            )))
        }
    }
}

/// Decode a raw reply frame.
pub fn decode_reply<T: DeserializeOwned>(method: Method, frame: &str) -> Result<Reply<T>, AppError> {
    serde_json::from_str(frame).map_err(|e| {
        AppError::MalformedResponse(format!("{} reply could not be decoded: {e}", method.as_str()))
    })
}

/// Operations against the daemon-management service.
///
/// `start` and `stop` are idempotent "ensure" operations; the rest are
/// read-only queries.
pub trait RemoteControl: Send + Sync + 'static {
    /// Reconfigure and (re)start the client. The boolean is the service's own verdict.
    fn start(&self, args: &StartArgs) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    fn query_running_state(&self) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn query_device_status(&self) -> impl Future<Output = Result<StatusColumns, AppError>> + Send;

    /// Raw candidate labels; may contain duplicates, nulls and empty strings.
    fn query_exit_node_candidates(
        &self,
    ) -> impl Future<Output = Result<Vec<Option<String>>, AppError>> + Send;

    fn query_mullvad_exit_nodes(
        &self,
    ) -> impl Future<Output = Result<MullvadCatalog, AppError>> + Send;
}
