use tracing::{error, info};

use cloudnest::{open_blob_store, Config, Database, WebServer};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = cloudnest::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        cloudnest::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> cloudnest::Result<()> {
    config.validate()?;

    info!("cloudnest {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let db = Database::open(&config.database.path).await?;
    let blobs = open_blob_store(&config.storage)?;

    let server = WebServer::new(&config, db, blobs)?;
    server.run().await?;
    Ok(())
}
