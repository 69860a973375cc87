use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client for the demo services behind the API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8787")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with the fruits service
    Fruits {
        #[command(subcommand)]
        action: FruitsAction,
    },
    /// Work with the names service
    Names {
        #[command(subcommand)]
        action: NamesAction,
    },
}

#[derive(Subcommand)]
enum FruitsAction {
    /// List all fruits
    List,
    /// Add a fruit by name
    Add { name: String },
}

#[derive(Subcommand)]
enum NamesAction {
    /// List all stored objects
    List,
    /// Store a JSON object, e.g. '{"name":"ada"}'
    Add { json: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = Url::parse(&cli.url)?;

    let res = match cli.command {
        Commands::Fruits { action: FruitsAction::List } => {
            client.get(endpoint(&base, &["fruits", ""])?).send().await?
        }
        Commands::Fruits { action: FruitsAction::Add { name } } => {
            client.get(endpoint(&base, &["fruits", "add", &name])?).send().await?
        }
        Commands::Names { action: NamesAction::List } => {
            client.get(endpoint(&base, &["names", ""])?).send().await?
        }
        Commands::Names { action: NamesAction::Add { json } } => {
            let body: Value = serde_json::from_str(&json)?;
            client.post(endpoint(&base, &["names", ""])?).json(&body).send().await?
        }
    };

    print_response(res).await
}

/// `base` with `segments` appended, each one percent-encoded.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| format!("'{}' cannot be used as a base url", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
