use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use proxy_client::config::{load_config, ClientConfig};
use proxy_client::http::{Body, Response};
use proxy_client::lifecycle::drain_interruptible;
use proxy_client::observability::logging::init_logging;
use proxy_client::{DrainOutcome, ProxyClient, RestClient, SendRequest};
use reqwest::Method;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Send requests through a fail-fast proxy client", long_about = None)]
struct Cli {
    /// Base URI of the service (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// TOML client configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-call timeout in seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Reuse one HTTP session for every call
    #[arg(long)]
    keep_alive: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "proxy_client=info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET {id}/
    Get {
        id: String,
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// GET the collection
    List {
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// POST a JSON document to the collection
    Create {
        #[arg(long)]
        json: Option<String>,
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// PUT a JSON document to {id}/
    Update {
        id: String,
        #[arg(long)]
        json: Option<String>,
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// DELETE {id}/
    Delete {
        id: String,
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// Arbitrary request relative to the base URI
    Send {
        endpoint: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        #[arg(long)]
        json: Option<String>,
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        /// Hand the call to the background worker and drain it before exiting
        #[arg(long)]
        queued: bool,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected 'Name: value', got '{raw}'"))
}

fn json_body(raw: Option<String>) -> Result<Option<Body>, serde_json::Error> {
    raw.map(|text| serde_json::from_str(&text).map(Body::Json))
        .transpose()
}

fn borrowed(params: &[(String, String)]) -> Vec<(&str, &str)> {
    params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

fn client_config(cli: &Cli) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.base_uri = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::try_from_secs_f64(secs)?);
    }
    if cli.keep_alive {
        config.keep_alive = true;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;
    let config = client_config(&cli)?;

    match cli.command {
        Commands::Get { id, params } => {
            let rest = RestClient::new(config)?;
            print_response(&rest.get(id, &borrowed(&params)).await?);
        }
        Commands::List { params } => {
            let rest = RestClient::new(config)?;
            print_response(&rest.list(&borrowed(&params)).await?);
        }
        Commands::Create { json, params } => {
            let rest = RestClient::new(config)?;
            print_response(&rest.create(json_body(json)?, &borrowed(&params)).await?);
        }
        Commands::Update { id, json, params } => {
            let rest = RestClient::new(config)?;
            print_response(&rest.update(id, json_body(json)?, &borrowed(&params)).await?);
        }
        Commands::Delete { id, params } => {
            let rest = RestClient::new(config)?;
            print_response(&rest.delete(id, &borrowed(&params)).await?);
        }
        Commands::Send {
            endpoint,
            method,
            json,
            params,
            headers,
            queued,
        } => {
            let client = ProxyClient::new(config)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut request = SendRequest::new(method, endpoint).queries(params);
            for (name, value) in headers {
                request = request.header(name, value);
            }
            if let Some(body) = json_body(json)? {
                request = request.body(body);
            }

            if queued {
                let request = request
                    .on_success(print_response)
                    .on_failure(|error| eprintln!("Error: {error}"));
                client.send_queued(request)?;
                let outcome = drain_interruptible(client.worker(), client.shutdown_timeout()).await?;
                if let DrainOutcome::TimedOut { pending } = outcome {
                    return Err(format!("{pending} queued request(s) not delivered").into());
                }
            } else {
                print_response(&client.send(request).await?);
            }
        }
    }

    Ok(())
}

fn print_response(response: &Response) {
    println!("HTTP {} ({:.3}ms)", response.status(), response.elapsed().as_secs_f64() * 1000.0);
    match response.json_value() {
        Some(json) => match serde_json::to_string_pretty(json) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{}", response.text()),
        },
        None if response.has_data() => println!("{}", response.text()),
        None => {}
    }
}
