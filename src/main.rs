//! Operator CLI for guarded Maps lookups.
//!
//! Runs one Maps operation through the same breaker and cache the service
//! uses, or inspects a breaker, and prints the result as JSON.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use guarded_maps::config::load_config;
use guarded_maps::maps::{Coordinates, MapsService};
use guarded_maps::observability::{logging, metrics};
use guarded_maps::store::{KeyValueStore, MemoryStore, RedisStore};

#[derive(Parser)]
#[command(name = "guarded-maps")]
#[command(about = "Circuit-broken, cached Google Maps lookups", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use a process-local store instead of Redis.
    #[arg(long)]
    memory_store: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place suggestions for free text
    Autocomplete {
        #[arg(long)]
        input: String,
    },
    /// Address for a place id
    PlaceDetails {
        #[arg(long)]
        place_id: String,
    },
    /// Address at a coordinate
    ReverseGeocode {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Distance from home to the current position
    Distance {
        #[arg(long)]
        email: String,
        #[arg(long, allow_hyphen_values = true)]
        home_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        home_lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Breaker state and failure count for an operation
    BreakerStatus {
        #[arg(long)]
        operation: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        redis_url = %config.redis.url,
        fail_max = config.breaker.fail_max,
        reset_timeout_secs = config.breaker.reset_timeout_secs,
        cache_ttl_secs = config.cache.default_ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let store: Arc<dyn KeyValueStore> = if cli.memory_store {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(RedisStore::connect(&config.redis).await?)
    };
    tracing::debug!(store = store.name(), "Store ready");

    let service = MapsService::from_config(&config, store)?;

    match cli.command {
        Commands::Autocomplete { input } => print_json(&service.autocomplete(&input).await?)?,
        Commands::PlaceDetails { place_id } => {
            print_json(&service.place_details(&place_id).await?)?
        }
        Commands::ReverseGeocode { lat, lng } => {
            print_json(&service.reverse_geocode(Coordinates::new(lat, lng)).await?)?
        }
        Commands::Distance {
            email,
            home_lat,
            home_lng,
            lat,
            lng,
        } => {
            let result = service
                .distance_from_home(
                    &email,
                    Coordinates::new(home_lat, home_lng),
                    Coordinates::new(lat, lng),
                )
                .await?;
            print_json(&result)?
        }
        Commands::BreakerStatus { operation } => {
            print_json(&service.breaker().status(&operation).await?)?
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
