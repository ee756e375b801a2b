//! Waitlist CLI - join, leave and run the queue from a terminal

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "waitlist")]
#[command(about = "Waitlist queue manager CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "WAITLIST_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Shared secret for admin commands
    #[arg(long, env = "WAITLIST_ADMIN_TOKEN", default_value = "", hide_env_values = true)]
    admin_token: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show queue status and the waiting list
    Status,

    /// Join the queue
    Join {
        /// Name to call out
        name: String,

        /// Optional contact email
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Leave the queue
    Leave {
        /// Ticket number returned by `join`
        ticket: String,
    },

    /// Look up a ticket
    Ticket {
        ticket: String,
    },

    /// Serve the next person (admin)
    ServeNext,

    /// Update queue settings (admin)
    Settings {
        /// Maximum number of waiting entries (1-1000)
        #[arg(long)]
        max_capacity: Option<i64>,

        /// Average service time in minutes (1-60)
        #[arg(long)]
        avg_service_time: Option<i64>,
    },

    /// Run maintenance operations (admin)
    Maintenance {
        /// Zero today's served counter and clear the now-serving entry
        #[arg(long)]
        reset_daily_stats: bool,

        /// Delete served entries older than this many days
        #[arg(long)]
        retention_days: Option<i64>,

        /// Force VACUUM
        #[arg(long)]
        force_vacuum: bool,
    },
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
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    position: i64,
    #[tabled(rename = "Ticket")]
    ticket_number: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Est. wait (min)")]
    estimated_wait_minutes: i64,
}

#[derive(Deserialize, Tabled)]
struct JoinResult {
    #[tabled(rename = "Ticket")]
    ticket_number: String,
    #[tabled(rename = "Position")]
    position: i64,
    #[tabled(rename = "Est. wait (min)")]
    estimated_wait_minutes: i64,
}

#[derive(Deserialize)]
struct StatsResult {
    waiting: i64,
    max_capacity: i64,
    avg_service_time_minutes: i64,
    total_served_today: i64,
    is_full: bool,
    currently_serving: Option<EntryRow>,
    waiting_list: Vec<EntryRow>,
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

fn mb(bytes: &serde_json::Value) -> f64 {
    bytes.as_i64().unwrap_or(0) as f64 / (1024.0 * 1024.0)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let result = call_rpc(&cli.rpc_url, "queue.stats.v1", json!({})).await?;
            let stats: StatsResult = serde_json::from_value(result)?;

            println!("{}", "Queue Status".cyan().bold());
            println!();
            let capacity = format!("{}/{}", stats.waiting, stats.max_capacity);
            let capacity = if stats.is_full {
                format!("{} (FULL)", capacity).red()
            } else {
                capacity.green()
            };
            println!("  {} {}", "Waiting:".bold(), capacity);
            println!(
                "  {} {} min",
                "Avg service time:".bold(),
                stats.avg_service_time_minutes
            );
            println!("  {} {}", "Served today:".bold(), stats.total_served_today);
            match &stats.currently_serving {
                Some(entry) => println!(
                    "  {} {} ({})",
                    "Now serving:".bold(),
                    entry.name,
                    entry.ticket_number
                ),
                None => println!("  {} -", "Now serving:".bold()),
            }
            println!();

            if stats.waiting_list.is_empty() {
                println!("{}", "Nobody is waiting".yellow());
            } else {
                println!("{}", Table::new(stats.waiting_list));
            }
        }

        Commands::Join { name, email } => {
            let params = json!({ "name": name, "email": email });
            let result = call_rpc(&cli.rpc_url, "queue.join.v1", params).await?;
            let joined: JoinResult = serde_json::from_value(result)?;

            println!("{}", "✓ Joined the queue".green().bold());
            println!();
            println!("{}", Table::new(vec![joined]));
        }

        Commands::Leave { ticket } => {
            call_rpc(&cli.rpc_url, "queue.leave.v1", json!({ "ticket_number": ticket })).await?;

            println!("{}", format!("✓ Ticket {} left the queue", ticket).green().bold());
        }

        Commands::Ticket { ticket } => {
            let result =
                call_rpc(&cli.rpc_url, "queue.ticket.v1", json!({ "ticket_number": ticket }))
                    .await?;
            let entry: EntryRow = serde_json::from_value(result)?;

            println!("{}", Table::new(vec![entry]));
        }

        Commands::ServeNext => {
            let params = json!({ "admin_token": cli.admin_token });
            let result = call_rpc(&cli.rpc_url, "admin.serve_next.v1", params).await?;

            match result.get("served").filter(|v| !v.is_null()) {
                Some(served) => {
                    let entry: EntryRow = serde_json::from_value(served.clone())?;
                    println!(
                        "{}",
                        format!("✓ Now serving {} ({})", entry.name, entry.ticket_number)
                            .green()
                            .bold()
                    );
                }
                None => println!("{}", "Queue is empty, nobody to serve".yellow()),
            }
            println!("  {} {}", "Still waiting:".bold(), result["waiting"]);
            println!("  {} {}", "Served today:".bold(), result["total_served_today"]);
        }

        Commands::Settings {
            max_capacity,
            avg_service_time,
        } => {
            let params = json!({
                "admin_token": cli.admin_token,
                "max_capacity": max_capacity,
                "avg_service_time": avg_service_time,
            });
            let result = call_rpc(&cli.rpc_url, "admin.settings.v1", params).await?;

            println!("{}", "✓ Settings saved".green().bold());
            println!("  {} {}", "Max capacity:".bold(), result["max_capacity"]);
            println!(
                "  {} {} min",
                "Avg service time:".bold(),
                result["avg_service_time_minutes"]
            );
        }

        Commands::Maintenance {
            reset_daily_stats,
            retention_days,
            force_vacuum,
        } => {
            println!("{}", "Running maintenance...".cyan().bold());
            println!();

            let params = json!({
                "admin_token": cli.admin_token,
                "reset_daily_stats": reset_daily_stats,
                "retention_days": retention_days,
                "force_vacuum": force_vacuum,
            });

            match call_rpc(&cli.rpc_url, "admin.maintenance.v1", params).await {
                Ok(result) => {
                    println!("  ✓ Maintenance completed");
                    println!();
                    if result["daily_stats_reset"].as_bool().unwrap_or(false) {
                        println!("  {} Daily stats reset", "✓".green());
                    }
                    println!(
                        "  {} {} served entries deleted",
                        "✓".green(),
                        result["entries_deleted"]
                    );
                    if result["vacuum_run"].as_bool().unwrap_or(false) {
                        println!("  {} VACUUM executed", "✓".green());
                    }
                    println!(
                        "  {} {:.2} MB → {:.2} MB",
                        "DB Size:".bold(),
                        mb(&result["db_size_before"]),
                        mb(&result["db_size_after"])
                    );
                }
                Err(e) => {
                    println!("  {} Maintenance failed: {}", "✗".red(), e);
                }
            }
        }
    }

    Ok(())
}
