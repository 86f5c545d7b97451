use anyhow::{Context, Result};
use clap::Parser;
use skyfacet::config::Settings;
use skyfacet::FacetGenerator;
use std::io::Read;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Skyfacet post generator
///
/// Turns plain text into a Bluesky post record with link, mention and tag facets
/// and prints it as JSON.
#[derive(Parser, Debug)]
#[command(name = "skyfacet")]
#[command(about = "Generate a Bluesky post with rich-text facets", long_about = None)]
struct Args {
    /// Post text; read from stdin when omitted
    text: Option<String>,

    /// Post language (repeatable)
    #[arg(short, long = "lang", default_value = "en")]
    langs: Vec<String>,

    /// Identity service used to resolve mentioned handles
    #[arg(long, env = "SKYFACET_SERVICE_URL")]
    service_url: Option<String>,

    /// Pretty-print the generated post
    #[arg(short, long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfacet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut settings = Settings::new().context("Failed to load settings")?;
    if let Some(url) = args.service_url {
        settings.resolver.service_url = url;
    }

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read post text from stdin")?;
            buf.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let generator = FacetGenerator::from_settings(&settings)?;
    let post = generator
        .generate_post(&text, args.langs)
        .await
        .context("Post generation failed")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&post)?
    } else {
        serde_json::to_string(&post)?
    };
    println!("{}", json);

    Ok(())
}
