use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use jobboard_server::config::AppConfig;
use jobboard_server::{build_router, setup_backend, AppState};

#[derive(Parser, Debug)]
#[command(name = "jobboard-server")]
#[command(about = "A job board REST API over users, companies, jobs and applications")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    // Fall back to the built-in configuration only when the default file is absent
    let mut app_config =
        if args.config == "config.yaml" && !std::path::Path::new("config.yaml").exists() {
            warn!("No config.yaml found, using default configuration (in-memory SQLite, development signing key)");
            AppConfig::default_config()
        } else {
            AppConfig::load_from_file(&args.config)
                .map_err(|e| format!("Failed to load configuration: {}", e))?
        };

    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host {
        app_config.server.host = host;
    }

    if let Some(db_config) = &app_config.backend.database {
        info!(
            server = %format!("{}:{}", app_config.server.host, app_config.server.port),
            database = %db_config.db_type,
            "Configuration loaded"
        );
    }

    let backend = setup_backend(&app_config).await?;

    let host: std::net::IpAddr = app_config.server.host.parse().unwrap_or_else(|_| {
        warn!(
            "Invalid host address: {}, using 127.0.0.1",
            app_config.server.host
        );
        [127, 0, 0, 1].into()
    });
    let addr = SocketAddr::from((host, app_config.server.port));

    let app = build_router(AppState::new(backend, app_config));

    info!("Job board server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
