//! Pulseboard CLI
//!
//! Command-line client for a running Pulseboard server:
//! - Inspect the live dashboard
//! - Manage admins and the creator role
//! - List and create campaigns

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

use pulseboard::admin::{is_valid_address, shorten};

#[derive(Parser)]
#[command(name = "pulseboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Pulseboard dashboard server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// Show the live dashboard widgets
    Dashboard,

    /// Show the top campaigns by growth
    Top {
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// List admins
    Admins {
        /// Case-insensitive address filter
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Grant admin rights
    AddAdmin { address: String },

    /// Revoke admin rights
    RemoveAdmin { address: String },

    /// Check whether an address is an admin
    CheckAdmin { address: String },

    /// Transfer the creator role
    TransferCreator { address: String },

    /// Show the admin activity log
    Activity,

    /// List campaigns
    Campaigns {
        /// Active, Pause or Cancel
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Create a campaign
    CreateCampaign {
        /// Creator address
        #[arg(long)]
        creator: String,
        /// Campaign label
        #[arg(long)]
        label: String,
        /// Goal in USD
        #[arg(long)]
        goal: String,
        /// Deadline, RFC 3339 or YYYY-MM-DDTHH:MM
        #[arg(long)]
        deadline: String,
        /// Metadata hash (defaults to the zero hash)
        #[arg(long)]
        metadata_hash: Option<String>,
        /// Do not accept WBTC
        #[arg(long)]
        no_token: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = Api {
        client: reqwest::Client::new(),
        base: format!("{}/api/v1", cli.api_url.trim_end_matches('/')),
    };
    let json_output = cli.format == "json";

    match cli.command {
        Commands::Status => {
            let response = api
                .client
                .get(format!("{}/health", cli.api_url.trim_end_matches('/')))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;

                    println!("Pulseboard v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("Feed:       {}", health["feed"].as_str().unwrap_or("unknown"));
                    println!("Clients:    {}", health["ws_connections"].as_u64().unwrap_or(0));

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to Pulseboard at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin pulseboard");
                    return Err(e.into());
                }
            }
        }

        Commands::Dashboard => {
            let data = api.get("/dashboard").await?;
            if json_output {
                return print_json(&data);
            }

            let stats = &data["stats"];
            println!("Total raised:  ${:.2}", data["pulse"]["total_raised"].as_f64().unwrap_or(0.0));
            println!("Per hour:      ${:.2}", stats["hourly_total"].as_f64().unwrap_or(0.0));
            println!("Per minute:    ${:.2}", stats["minute_total"].as_f64().unwrap_or(0.0));
            println!("Today:         ${:.2}", stats["today_total"].as_f64().unwrap_or(0.0));
            println!();

            let recent = data["pulse"]["recent"].as_array().cloned().unwrap_or_default();
            if recent.is_empty() {
                println!("No donations yet.");
            } else {
                println!("{:<16} {:<14} {:>10} {:<6} {:>10}", "Time", "Campaign", "Amount", "", "USD");
                println!("{}", "-".repeat(62));
                for sample in recent {
                    println!(
                        "{:<16} {:<14} {:>10.4} {:<6} {:>10.2}",
                        format_timestamp(sample["timestamp"].as_i64().unwrap_or(0)),
                        shorten(sample["campaign"].as_str().unwrap_or("-")),
                        sample["amount"].as_f64().unwrap_or(0.0),
                        sample["currency"].as_str().unwrap_or("-"),
                        sample["usd_value"].as_f64().unwrap_or(0.0),
                    );
                }
            }
        }

        Commands::Top { limit } => {
            let data = api.get(&format!("/dashboard/top-campaigns?limit={}", limit)).await?;
            if json_output {
                return print_json(&data);
            }

            println!("{:<22} {:>12} {:>8} {:>8}", "Campaign", "Raised", "Growth", "Donors");
            println!("{}", "-".repeat(54));
            for row in data.as_array().cloned().unwrap_or_default() {
                println!(
                    "{:<22} {:>12.2} {:>7.1}% {:>8}",
                    row["name"].as_str().unwrap_or("-"),
                    row["raised"].as_f64().unwrap_or(0.0),
                    row["growth"].as_f64().unwrap_or(0.0),
                    row["contributors"].as_u64().unwrap_or(0),
                );
            }
        }

        Commands::Admins { query } => {
            let path = match query {
                Some(q) => format!("/admins?q={}", q),
                None => "/admins".to_string(),
            };
            let data = api.get(&path).await?;
            if json_output {
                return print_json(&data);
            }

            let admins = data["admins"].as_array().cloned().unwrap_or_default();
            if admins.is_empty() {
                println!("No admins match.");
            } else {
                println!("{:<44} {:<14} {:<12} {}", "Address", "Added by", "Added", "Status");
                println!("{}", "-".repeat(80));
                for admin in admins {
                    println!(
                        "{:<44} {:<14} {:<12} {}",
                        admin["address"].as_str().unwrap_or("-"),
                        shorten(admin["added_by"].as_str().unwrap_or("-")),
                        admin["added_at"].as_str().unwrap_or("-"),
                        admin["status"].as_str().unwrap_or("-"),
                    );
                }
            }
        }

        Commands::AddAdmin { address } => {
            check_address(&address)?;
            let data = api.post("/admins", json!({ "address": address })).await?;
            if json_output {
                return print_json(&data);
            }
            println!("Admin added: {}", data["address"].as_str().unwrap_or(&address));
        }

        Commands::RemoveAdmin { address } => {
            check_address(&address)?;
            let data = api.delete(&format!("/admins/{}", address)).await?;
            if json_output {
                return print_json(&data);
            }
            if data["removed"].as_bool().unwrap_or(false) {
                println!("Admin removed: {}", address);
            } else {
                println!("{} was not an admin", address);
            }
        }

        Commands::CheckAdmin { address } => {
            check_address(&address)?;
            let data = api.post(&format!("/admins/{}/check", address), Value::Null).await?;
            if json_output {
                return print_json(&data);
            }
            let verdict = if data["is_admin"].as_bool().unwrap_or(false) {
                "is"
            } else {
                "is not"
            };
            println!("{} {} an admin", address, verdict);
        }

        Commands::TransferCreator { address } => {
            check_address(&address)?;
            let data = api
                .post("/creator/transfer", json!({ "address": address }))
                .await?;
            if json_output {
                return print_json(&data);
            }
            println!("Creator is now {}", data["creator"].as_str().unwrap_or(&address));
        }

        Commands::Activity => {
            let data = api.get("/admins/activity").await?;
            if json_output {
                return print_json(&data);
            }

            println!("{:<22} {:<14} {:<14} {}", "Action", "Performer", "Target", "When");
            println!("{}", "-".repeat(76));
            for entry in data["entries"].as_array().cloned().unwrap_or_default() {
                println!(
                    "{:<22} {:<14} {:<14} {}",
                    entry["action"].as_str().unwrap_or("-"),
                    entry["performer"].as_str().unwrap_or("-"),
                    entry["target"].as_str().unwrap_or("-"),
                    entry["timestamp"].as_str().unwrap_or("-"),
                );
            }
        }

        Commands::Campaigns { status } => {
            let path = match status {
                Some(s) => format!("/campaigns?status={}", s),
                None => "/campaigns".to_string(),
            };
            let data = api.get(&path).await?;
            let summary = api.get("/campaigns/stats").await?;
            if json_output {
                return print_json(&json!({ "campaigns": data, "stats": summary }));
            }

            println!("{:<4} {:<22} {:<8} {:>12} {:>9}", "ID", "Name", "Status", "Goal", "Progress");
            println!("{}", "-".repeat(60));
            for campaign in data["campaigns"].as_array().cloned().unwrap_or_default() {
                println!(
                    "{:<4} {:<22} {:<8} {:>12.2} {:>8.1}%",
                    campaign["id"].as_u64().unwrap_or(0),
                    campaign["name"].as_str().unwrap_or("-"),
                    campaign["status"].as_str().unwrap_or("-"),
                    campaign["goal"].as_f64().unwrap_or(0.0),
                    campaign["progress"].as_f64().unwrap_or(0.0),
                );
            }
            println!();
            println!(
                "{} campaigns, {} active, ${:.2} raised, {:.1}% average progress",
                summary["total"].as_u64().unwrap_or(0),
                summary["active"].as_u64().unwrap_or(0),
                summary["total_raised"].as_f64().unwrap_or(0.0),
                summary["average_progress"].as_f64().unwrap_or(0.0),
            );
        }

        Commands::CreateCampaign {
            creator,
            label,
            goal,
            deadline,
            metadata_hash,
            no_token,
        } => {
            check_address(&creator)?;
            let body = json!({
                "creator_address": creator,
                "label": label,
                "goal_amount": goal,
                "deadline": deadline,
                "metadata_hash": metadata_hash,
                "token_enabled": !no_token,
            });
            let data = api.post("/campaigns", body).await?;
            if json_output {
                return print_json(&data);
            }
            println!(
                "Created campaign #{} \"{}\" at {}",
                data["id"].as_u64().unwrap_or(0),
                data["name"].as_str().unwrap_or(&label),
                data["address"].as_str().unwrap_or("-"),
            );
        }

        Commands::Config { output } => {
            let config = pulseboard::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Thin JSON client over the `/api/v1` routes
struct Api {
    client: reqwest::Client,
    base: String,
}

impl Api {
    async fn get(&self, path: &str) -> anyhow::Result<Value> {
        let request = self.client.get(format!("{}{}", self.base, path));
        send(request).await
    }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        let mut request = self.client.post(format!("{}{}", self.base, path));
        if !body.is_null() {
            request = request.json(&body);
        }
        send(request).await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        let request = self.client.delete(format!("{}{}", self.base, path));
        send(request).await
    }
}

async fn send(request: reqwest::RequestBuilder) -> anyhow::Result<Value> {
    let response = request.send().await.context("request failed")?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(text);
    bail!("Failed ({}): {}", status, message)
}

/// Catch typos before waiting on a simulated submission
fn check_address(address: &str) -> anyhow::Result<()> {
    if !is_valid_address(address.trim()) {
        bail!("Invalid address: {} (expected 0x followed by 40 hex digits)", address);
    }
    Ok(())
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
