use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use oracle_gateway::security::sanitize_with_threat_detection;

#[derive(Parser)]
#[command(name = "oracle-cli")]
#[command(about = "Management CLI for the Oracle Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081", env = "ORACLE_ADMIN_URL")]
    url: String,

    #[arg(short, long, env = "ORACLE_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Show tracked rate limit windows
    Limits,
    /// Clear one rate limit key, or all of them
    Reset {
        #[arg(long, requires = "category")]
        identifier: Option<String>,
        #[arg(long, requires = "identifier")]
        category: Option<String>,
    },
    /// Sanitize text locally and list detected threats
    Scan {
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Scan { text } = &cli.command {
        let report = sanitize_with_threat_detection(text);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let client = reqwest::Client::new();
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let limits_url = format!("{}/admin/rate-limits", cli.url);
    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Limits => client.get(&limits_url),
        Commands::Reset {
            identifier,
            category,
        } => {
            let mut query = Vec::new();
            if let (Some(identifier), Some(category)) = (identifier, category) {
                query.push(("identifier", identifier));
                query.push(("category", category));
            }
            client.delete(&limits_url).query(&query)
        }
        Commands::Scan { .. } => unreachable!("handled above"),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
