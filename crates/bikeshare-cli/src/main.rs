mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bikeshare-cli")]
#[command(about = "Bike-share station availability command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Run one catalog pass then one counts pass against the live feed
    Sync,
    /// List open stations with their current counts
    Stations,
    /// Show one station by exact name
    Station {
        /// Station name (case-sensitive)
        name: String,
    },
    /// Find the nearest open station to a point
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Search radius in miles (defaults to BIKESHARE_NEAREST_RADIUS_MILES)
        #[arg(long)]
        radius_miles: Option<f64>,
        /// Candidates to scan (defaults to BIKESHARE_NEAREST_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("bikeshare-cli: no command given; see --help");
        return Ok(());
    };

    let config = bikeshare_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = bikeshare_db::PoolConfig::from_app_config(&config);
    let pool = bikeshare_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => commands::run_migrate(&pool).await?,
        Commands::Sync => commands::run_sync(&pool, &config).await?,
        Commands::Stations => commands::run_stations(&pool, &config).await?,
        Commands::Station { name } => commands::run_station(&pool, &config, &name).await?,
        Commands::Nearest {
            latitude,
            longitude,
            radius_miles,
            limit,
        } => {
            let query = bikeshare_engine::NearestQuery {
                latitude: Some(latitude),
                longitude: Some(longitude),
                radius_miles,
                limit,
            };
            commands::run_nearest(&pool, &config, &query).await?;
        }
    }

    pool.close().await;
    Ok(())
}
