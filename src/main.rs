use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use classe_microservice::config;
use classe_microservice::database::DatabaseManager;
use classe_microservice::middleware::OAuthGateway;
use classe_microservice::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "classe-microservice", version, about = "Classes and exams API")]
struct Args {
    /// Port to listen on (overrides PORT / CLASSES_API_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Do not create collections and indexes at startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up MONGODB_* and OAUTH_*
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.api.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Classe Microservice in {:?} mode", config.environment);

    let repository = DatabaseManager::connect(&config.database, !args.skip_migrations)
        .await
        .context("failed to open class store")?;

    let gateway = OAuthGateway::from_config(&config.oauth).context("invalid OAuth configuration")?;
    info!("Validating tokens against {}", config.oauth.validate_url()?);

    let router = app(AppState::new(repository), Arc::new(gateway), &config.api);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Classe Microservice listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
