mod error;

use std::time::Duration;

use clap::Parser;
use serde_json::json;
use shopsight_sdk::ShopsightSdk;
use tracing_subscriber::EnvFilter;

use error::DemoError;

#[derive(Debug, Parser)]
#[command(
    name = "shopsight-dashboard",
    version,
    about = "Search the catalogue and print the analytics view model as JSON"
)]
struct Args {
    #[arg(long, env = "SHOPSIGHT_API_URL", default_value = "http://localhost:8000")]
    api_url: String,
    /// Free-text product search
    #[arg(long, default_value = "running shoes")]
    query: String,
    /// Product to select instead of the first search hit
    #[arg(long)]
    product: Option<String>,
    /// Optional question for the analytics agent
    #[arg(long)]
    ask: Option<String>,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        let err = json!({ "error": e.message, "kind": e.kind });
        eprintln!("{err:#}");
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> Result<(), DemoError> {
    let sdk = ShopsightSdk::builder()
        .api_url(args.api_url)
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;

    let products = sdk.search(&args.query).await;
    let product_id = match args.product {
        Some(id) => id,
        None => products
            .first()
            .map(|p| p.product_id.clone())
            .ok_or_else(|| DemoError::usage(format!("no products match {:?}", args.query)))?,
    };

    let view = sdk.select(&product_id).await?;
    let suggestions = sdk.agent().suggestions().await.ok();
    let analysis = match args.ask.as_deref() {
        Some(question) => Some(sdk.agent().analyze(question).await?),
        None => None,
    };

    let out = json!({
        "products": products,
        "view": view,
        "suggestions": suggestions,
        "analysis": analysis,
    });
    println!("{out:#}");
    tracing::debug!(%sdk, "done");
    Ok(())
}
