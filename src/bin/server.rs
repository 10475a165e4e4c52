use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use claims_api::db::ClaimStore;
use claims_api::db::services::RedshiftStore;
use claims_api::server::config::ServerConfig;
use claims_api::server::listener::bind_listener;
use claims_api::server::logging::init_logging;
use claims_api::server::shutdown::shutdown_signal;
use claims_api::version::{SERVICE_NAME, VERSION};
use claims_api::web::create_axum_router;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to bind, e.g. 0.0.0.0
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Manually check for --version before full parsing to keep the output simple.
    if std::env::args().any(|arg| arg == "--version") {
        println!("claims-api version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();

    // Logging is not up yet, so configuration errors go to stderr via the returned error.
    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    server_config.override_bind(args.host, args.port);

    init_logging(&server_config)?;
    info!(service = SERVICE_NAME, version = VERSION, "Starting server");
    info!(config = ?server_config, "Loaded configuration");

    let server_config = Arc::new(server_config);
    let redshift_store = Arc::new(RedshiftStore::new(&server_config));
    let store: Arc<dyn ClaimStore> = redshift_store.clone();

    let bind_address = server_config.bind_address();
    let listener = match bind_listener(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %bind_address, error = %e, "Failed to bind listener");
            return Err(e.into());
        }
    };

    let app = create_axum_router(store, server_config.clone());

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    redshift_store.close().await;
    info!("Server stopped");
    Ok(())
}
