use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use tailscale_control_lib::config;
use tailscale_control_lib::reconciler::Reconciler;
use tailscale_control_lib::remote::PluginBridge;
use tailscale_control_lib::services::{self, Poller};

#[derive(Parser)]
#[command(name = "tailscale-control", version, about = "Toggle and reconcile the Tailscale client")]
struct Cli {
    /// Preference database path.
    #[arg(long, env = "TAILSCALE_CONTROL_DB", default_value_os_t = default_db_path())]
    db: PathBuf,

    /// Unix socket of the plugin host.
    #[arg(long, env = "TAILSCALE_CONTROL_SOCKET")]
    socket: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print settings, derived flags and device status.
    Status,
    /// Turn the client on with the stored settings.
    On,
    /// Turn the client off and clear the exit node selection.
    Off,
    /// Select an exit node by its list label ("Unset" clears it).
    ExitNode { label: String },
    /// Switch exit node mode.
    ExitNodeMode { state: Switch },
    /// Allow or deny LAN access while using an exit node.
    Lan { state: Switch },
    /// Set the control-plane URL (restarts the client if it is on).
    LoginServer { url: String },
    /// Refresh and print the exit node candidates.
    ExitNodes,
    /// Print Mullvad exit nodes grouped by country.
    Mullvad,
    /// Poll the daemon and print the panel state every second until Ctrl-C.
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}

fn default_db_path() -> PathBuf {
    std::env::var_os("DECKY_PLUGIN_SETTINGS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(config::DATABASE_FILE_NAME)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tailscale_control_lib::init_tracing();
    let cli = Cli::parse();

    let prefs = tailscale_control_lib::open_preferences(&cli.db)?;
    let remote = Arc::new(PluginBridge::connect(&cli.socket).await?);
    let reconciler = Arc::new(Reconciler::new(prefs, remote));

    match cli.command {
        Command::Status => {}
        Command::On => reconciler.toggle_master(true).await?,
        Command::Off => reconciler.toggle_master(false).await?,
        Command::ExitNode { label } => reconciler.select_exit_node(&label).await?,
        Command::ExitNodeMode { state } => reconciler.set_exit_node_mode(state.is_on()).await?,
        Command::Lan { state } => reconciler.set_allow_lan(state.is_on()).await?,
        Command::LoginServer { url } => reconciler.confirm_login_server(&url).await?,
        Command::ExitNodes => {
            services::poll_once(&reconciler).await;
            let list = reconciler.open_exit_node_list().await?;
            return print_json(&list);
        }
        Command::Mullvad => {
            let catalog = reconciler.mullvad_exit_nodes().await?;
            return print_json(&catalog);
        }
        Command::Watch => {
            let poller = Poller::attach(Arc::clone(&reconciler));
            let mut ticker =
                tokio::time::interval(Duration::from_secs(config::POLL_INTERVAL_SECS));
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = ticker.tick() => print_json(&reconciler.snapshot())?,
                }
            }
            poller.detach().await;
            return Ok(());
        }
    }

    // A fresh process knows nothing about the daemon until it has polled once.
    services::poll_once(&reconciler).await;
    print_json(&reconciler.snapshot())
}
