use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "secrets-cli")]
#[command(about = "Client for the pin-secrets HTTP API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "SECRETS_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the server is alive
    Ping,
    /// Show PIN size, attempt and expiration limits
    Params,
    /// Store a message
    Create {
        #[arg(short, long)]
        message: String,
        /// Lifetime in seconds
        #[arg(short, long, default_value_t = 600)]
        exp: u64,
        #[arg(short, long)]
        pin: String,
    },
    /// Read (and destroy) a message
    Get {
        #[arg(short, long)]
        key: String,
        #[arg(short, long)]
        pin: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.as_str();

    match cli.command {
        Commands::Ping => {
            let res = client.get(endpoint(base, &["v1", "ping"])?).send().await?;
            let status = res.status();
            println!("{} {}", status, res.text().await?);
        }
        Commands::Params => {
            let res = client.get(endpoint(base, &["v1", "params"])?).send().await?;
            print_response(res).await?;
        }
        Commands::Create { message, exp, pin } => {
            let res = client
                .post(endpoint(base, &["v1", "message"])?)
                .json(&json!({ "Message": message, "Exp": exp, "Pin": pin }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { key, pin } => {
            let res = client
                .get(endpoint(base, &["v1", "message", &key, &pin])?)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Append `segments` to the base URL, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<reqwest::Url, Box<dyn std::error::Error>> {
    let mut url = reqwest::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| "server URL cannot carry a path")?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
