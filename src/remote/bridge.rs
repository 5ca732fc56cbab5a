//! Newline-delimited JSON transport to the plugin host.
//!
//! Each call writes one `{"method": ..., "args": {...}}` line and reads exactly
//! one reply line. The stream is held for the whole exchange so concurrent
//! callers cannot interleave frames.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use super::{decode_reply, Method, MullvadCatalog, RemoteControl, Reply, StartArgs};
use crate::core::StatusColumns;
use crate::error::AppError;

#[derive(Serialize)]
struct Request<'a> {
    method: &'a str,
    args: Value,
}

/// [`RemoteControl`] over any bidirectional byte stream.
pub struct PluginBridge<S> {
    io: Mutex<BufReader<S>>,
}

impl<S> PluginBridge<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(stream: S) -> Self {
        Self {
            io: Mutex::new(BufReader::new(stream)),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        args: Value,
    ) -> Result<Reply<T>, AppError> {
        let mut frame = serde_json::to_vec(&Request {
            method: method.as_str(),
            args,
        })
        .map_err(|e| AppError::InvalidInput(format!("cannot encode {}: {e}", method.as_str())))?;
        frame.push(b'\n');

        let mut io = self.io.lock().await;
        io.get_mut().write_all(&frame).await?;
        io.get_mut().flush().await?;

        let mut line = String::new();
        if io.read_line(&mut line).await? == 0 {
            return Err(AppError::Remote(format!(
                "plugin host closed the connection during {}",
                method.as_str()
            )));
        }
        tracing::trace!("{} -> {}", method.as_str(), line.trim_end());
        decode_reply(method, &line)
    }
}

#[cfg(unix)]
impl PluginBridge<tokio::net::UnixStream> {
    /// Connect to the plugin host's Unix socket.
    pub async fn connect(path: &std::path::Path) -> Result<Self, AppError> {
        let stream = tokio::net::UnixStream::connect(path).await.map_err(|e| {
            AppError::Io(format!("cannot connect to {}: {e}", path.display()))
        })?;
        tracing::info!("Connected to plugin host at {}", path.display());
        Ok(Self::new(stream))
    }
}

impl<S> RemoteControl for PluginBridge<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn start(&self, args: &StartArgs) -> Result<bool, AppError> {
        let args = serde_json::to_value(args)
            .map_err(|e| AppError::InvalidInput(format!("cannot encode start args: {e}")))?;
        self.call(Method::Up, args).await?.into_result(Method::Up)
    }

    async fn stop(&self) -> Result<(), AppError> {
        self.call::<Value>(Method::Down, json!({}))
            .await?
            .into_ack(Method::Down)
    }

    async fn query_running_state(&self) -> Result<bool, AppError> {
        self.call(Method::State, json!({}))
            .await?
            .into_result(Method::State)
    }

    async fn query_device_status(&self) -> Result<StatusColumns, AppError> {
        self.call(Method::DeviceStatus, json!({}))
            .await?
            .into_result(Method::DeviceStatus)
    }

    async fn query_exit_node_candidates(&self) -> Result<Vec<Option<String>>, AppError> {
        self.call(Method::ExitNodeList, json!({}))
            .await?
            .into_result(Method::ExitNodeList)
    }

    async fn query_mullvad_exit_nodes(&self) -> Result<MullvadCatalog, AppError> {
        self.call(Method::MullvadList, json!({}))
            .await?
            .into_result(Method::MullvadList)
    }
}
