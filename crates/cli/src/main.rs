//! NetGuard CLI - Command-line interface for the NetGuard daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9632";

#[derive(Parser)]
#[command(name = "netguard")]
#[command(about = "NetGuard network watchdog CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "NETGUARD_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring a network adapter
    Start {
        /// Adapter name (see `netguard adapters`)
        #[arg(short, long)]
        adapter: String,
    },

    /// Stop monitoring
    Stop,

    /// Show watchdog status
    Status,

    /// Show recent log lines
    Logs {
        /// Number of lines to tail
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },

    /// List network adapters
    Adapters,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct StartResult {
    session_id: String,
    adapter: String,
    started_at: String,
}

#[derive(Deserialize, Tabled)]
struct AdapterRow {
    name: String,
    active: bool,
}

#[derive(Deserialize)]
struct AdaptersResult {
    adapters: Vec<AdapterRow>,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

/// Colored state label for the status view
fn paint_state(state: &str) -> colored::ColoredString {
    match state {
        "ONLINE" | "MONITORING" => state.green(),
        "OFFLINE" | "ALERT_RAISED" => state.red(),
        "DEGRADING" | "RECOVERING" => state.yellow(),
        _ => state.normal(),
    }
}

fn print_status(status: &serde_json::Value) {
    let watchdog = &status["watchdog"];
    let running = status["running"].as_bool().unwrap_or(false);

    if running {
        println!("  {} {}", "Monitoring:".bold(), "RUNNING".green());
    } else {
        println!("  {} {}", "Monitoring:".bold(), "STOPPED".yellow());
    }
    if let Some(session) = status["session"].as_object() {
        println!("  {} {}", "Adapter:".bold(), session["adapter"].as_str().unwrap_or("-"));
        println!("  {} {}", "Session:".bold(), session["session_id"].as_str().unwrap_or("-"));
        println!("  {} {}", "Since:".bold(), session["started_at"].as_str().unwrap_or("-"));
    }
    println!();
    println!(
        "  {} {}",
        "Connectivity:".bold(),
        paint_state(watchdog["connectivity"].as_str().unwrap_or("UNKNOWN"))
    );
    println!(
        "  {} {}",
        "Watchdog:".bold(),
        paint_state(watchdog["state"].as_str().unwrap_or("IDLE"))
    );
    if let Some(secs) = watchdog["outage_secs"].as_u64() {
        println!("  {} {} seconds", "Outage:".bold(), secs);
    }
    println!("  {} {}", "Recovery cycles:".bold(), watchdog["recovery_cycles"]);
    println!("  {} {}", "Alerts raised:".bold(), watchdog["alerts_raised"]);
    if watchdog["unresolved"].as_bool().unwrap_or(false) {
        println!("  {} {}", "⚠".red(), "Outage unresolved after adapter restart".red());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { adapter } => {
            let params = json!({ "adapter": adapter });

            let result = call_rpc(&cli.rpc_url, "monitor.start.v1", params).await?;
            let started: StartResult = serde_json::from_value(result)?;

            println!("{}", "✓ Monitoring started".green().bold());
            println!();

            let table = Table::new(vec![started]).to_string();
            println!("{}", table);
        }

        Commands::Stop => {
            let result = call_rpc(&cli.rpc_url, "monitor.stop.v1", json!({})).await?;

            if result["stopped"].as_bool().unwrap_or(false) {
                println!("{}", "✓ Monitoring stopped".green().bold());
            } else {
                println!("{}", "Monitoring was not running".yellow());
            }
        }

        Commands::Status => {
            println!("{}", "NetGuard Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "monitor.status.v1", json!({})).await {
                Ok(status) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Daemon:".bold(), "ONLINE".green());
                    print_status(&status);
                }
                Err(e) => {
                    println!("  {} {}", "Daemon:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Logs { lines } => {
            let params = json!({ "lines": lines });

            let result = call_rpc(&cli.rpc_url, "logs.tail.v1", params).await?;
            let entries: Vec<String> =
                serde_json::from_value(result["lines"].clone()).unwrap_or_default();

            if entries.is_empty() {
                println!("{}", "No logs available".yellow());
            } else {
                for line in entries {
                    println!("{}", line);
                }
            }
        }

        Commands::Adapters => {
            let result = call_rpc(&cli.rpc_url, "adapters.list.v1", json!({})).await?;
            let listed: AdaptersResult = serde_json::from_value(result)?;

            if listed.adapters.is_empty() {
                println!("{}", "No network adapters found".yellow());
            } else {
                println!("{}", Table::new(listed.adapters));
            }
        }
    }

    Ok(())
}
