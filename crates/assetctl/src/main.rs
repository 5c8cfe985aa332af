//! assetctl - load, size and inspect cached icon assets

mod report;

use anyhow::{Context, Result};
use assetcache::{AssetBinding, AssetLoader, LoaderConfig, DEFAULT_COLOR, DEFAULT_SCALE};
use assetstore::AssetStore;
use clap::{Parser, Subcommand};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Prefix joined with `<name>.svg` to build request URIs
    #[arg(short, long, env = "ASSET_ORIGIN", default_value = "http://localhost/")]
    origin: String,

    /// Store directory
    #[arg(short, long, env = "ASSET_DATA_DIR", default_value = "./data")]
    data: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load assets and print their render state
    Load {
        /// Asset names
        #[arg(required = true)]
        names: Vec<String>,

        /// Scale applied to the viewBox dimensions
        #[arg(short, long, default_value_t = DEFAULT_SCALE)]
        scale: f64,

        /// Theme colour
        #[arg(short, long, default_value = DEFAULT_COLOR)]
        color: String,
    },

    /// Print what the store holds for an asset, without network access
    Show {
        /// Asset name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let store = Arc::new(
        AssetStore::open(&args.data)
            .with_context(|| format!("Failed to open store at {}", args.data))?,
    );
    info!("Store opened at {} ({} keys)", args.data, store.len());

    match args.command {
        Command::Load {
            names,
            scale,
            color,
        } => {
            let config = LoaderConfig::new(args.origin)
                .with_timeout(Duration::from_secs(args.timeout_secs));
            info!("Loading from {}", config.origin);

            let loader = AssetLoader::new(config, store.clone())?;
            let loader = &loader;
            let color = &color;

            let loads = names.iter().map(|name| async move {
                let mut icon: AssetBinding = AssetBinding::default()
                    .with_source(name.as_str())
                    .with_scale(scale)
                    .with_color(color.as_str());
                icon.load(loader).await.map(|_| icon)
            });

            for (name, result) in names.iter().zip(join_all(loads).await) {
                match result {
                    Ok(icon) => println!("{}", report::render(&icon)),
                    Err(e) => error!("Failed to load {}: {}", name, e),
                }
            }

            let stats = loader.stats();
            info!(
                "store hits: {}, fetches: {}, fallbacks: {}, hit ratio: {:.2}",
                stats.store_hits(),
                stats.fetches(),
                stats.fallbacks(),
                stats.hit_ratio()
            );
        }
        Command::Show { name } => {
            println!("{}", report::show(&name, &*store)?);
        }
    }

    store.close()?;
    Ok(())
}
