//! Typed access to the seven persisted panel settings.
//!
//! Every entry is stored as a JSON envelope `{ "value": T }` under a fixed key.
//! Two read flavors exist because the stored format cannot tell "never set"
//! apart from "set to a falsy value" through the plain getter:
//!
//! - [`Preferences::get`] treats a falsy `value` (`false`, `0`, `""`, `null`)
//!   exactly like a missing entry and returns the default.
//! - [`Preferences::get_present`] returns whatever was stored, falsy or not,
//!   and only falls back when the entry is absent.
//!
//! Corrupt entries never propagate out of either getter: they are logged and
//! the default is returned. [`Preferences::try_get`] exposes the error.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;
use crate::core::exit_nodes::{self, ExitNodeOption};
use crate::db::KeyValueStore;
use crate::error::AppError;

/// The fixed preference keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    Toggle,
    ExitNode,
    NodeIp,
    AllowLan,
    ExitNodeList,
    LoginServer,
    ExitNodeListDisabled,
}

impl PrefKey {
    pub const ALL: [PrefKey; 7] = [
        PrefKey::Toggle,
        PrefKey::ExitNode,
        PrefKey::NodeIp,
        PrefKey::AllowLan,
        PrefKey::ExitNodeList,
        PrefKey::LoginServer,
        PrefKey::ExitNodeListDisabled,
    ];

    /// Storage key name. These names are shared with previously written data.
    pub fn as_str(self) -> &'static str {
        match self {
            PrefKey::Toggle => "tailscaleToggle",
            PrefKey::ExitNode => "tailscaleExitNode",
            PrefKey::NodeIp => "tailscaleNodeIP",
            PrefKey::AllowLan => "tailscaleAllowLAN",
            PrefKey::ExitNodeList => "tailscaleExitNodeList",
            PrefKey::LoginServer => "tailscaleLoginServer",
            PrefKey::ExitNodeListDisabled => "tailscaleExitNodeListDisabled",
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    value: &'a T,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    value: Option<Value>,
}

/// JavaScript-style truthiness of a stored JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Point-in-time copy of every persisted setting, read with presence semantics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceSnapshot {
    pub toggle: bool,
    pub exit_node: bool,
    pub node_ip: String,
    pub allow_lan: bool,
    pub login_server: String,
    pub exit_node_list: Vec<ExitNodeOption>,
    pub exit_node_list_disabled: bool,
}

impl Default for PreferenceSnapshot {
    fn default() -> Self {
        Self {
            toggle: false,
            exit_node: false,
            node_ip: String::new(),
            allow_lan: true,
            login_server: config::DEFAULT_LOGIN_SERVER.to_string(),
            exit_node_list: exit_nodes::sentinel_list(),
            exit_node_list_disabled: true,
        }
    }
}

/// Typed preference accessor shared by every component that needs settings.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the envelope's `value` field. `None` when the entry or field is missing.
    fn read_value(&self, key: PrefKey) -> Result<Option<Value>, AppError> {
        let Some(raw) = self.store.read_raw(key.as_str())? else {
            return Ok(None);
        };
        let envelope: RawEnvelope =
            serde_json::from_str(&raw).map_err(|e| AppError::CorruptPreference {
                key: key.as_str(),
                reason: e.to_string(),
            })?;
        Ok(envelope.value)
    }

    fn decode<T: DeserializeOwned>(key: PrefKey, value: Value) -> Result<T, AppError> {
        serde_json::from_value(value).map_err(|e| AppError::CorruptPreference {
            key: key.as_str(),
            reason: e.to_string(),
        })
    }

    /// Presence-aware typed read. `Ok(None)` when nothing (or `null`) is stored.
    pub fn try_get<T: DeserializeOwned>(&self, key: PrefKey) -> Result<Option<T>, AppError> {
        match self.read_value(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Self::decode(key, value).map(Some),
        }
    }

    /// Read with the falsy fallback: a stored `false`, `0`, `""` or `null`
    /// yields `default`, just like a missing entry.
    pub fn get<T: DeserializeOwned>(&self, key: PrefKey, default: T) -> T {
        let value = match self.read_value(key) {
            Ok(Some(value)) if is_truthy(&value) => value,
            Ok(_) => return default,
            Err(e) => {
                tracing::warn!("{e}; using default");
                return default;
            }
        };
        Self::decode(key, value).unwrap_or_else(|e| {
            tracing::warn!("{e}; using default");
            default
        })
    }

    /// Read that keeps stored falsy values; `default` only when absent or corrupt.
    pub fn get_present<T: DeserializeOwned>(&self, key: PrefKey, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!("{e}; using default");
                default
            }
        }
    }

    /// Serialize `{ value }` and write it unconditionally.
    pub fn set<T: Serialize>(&self, key: PrefKey, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(&Envelope { value }).map_err(|e| {
            AppError::InvalidInput(format!("cannot encode {}: {e}", key.as_str()))
        })?;
        self.store.write_raw(key.as_str(), &raw)?;
        tracing::debug!("Preference {} <- {raw}", key.as_str());
        Ok(())
    }

    /// Read every setting fresh from the store.
    pub fn snapshot(&self) -> PreferenceSnapshot {
        let defaults = PreferenceSnapshot::default();
        PreferenceSnapshot {
            toggle: self.get_present(PrefKey::Toggle, defaults.toggle),
            exit_node: self.get_present(PrefKey::ExitNode, defaults.exit_node),
            node_ip: self.get_present(PrefKey::NodeIp, defaults.node_ip),
            allow_lan: self.get_present(PrefKey::AllowLan, defaults.allow_lan),
            login_server: self.get_present(PrefKey::LoginServer, defaults.login_server),
            exit_node_list: self.get_present(PrefKey::ExitNodeList, defaults.exit_node_list),
            exit_node_list_disabled: self.get_present(
                PrefKey::ExitNodeListDisabled,
                defaults.exit_node_list_disabled,
            ),
        }
    }
}
