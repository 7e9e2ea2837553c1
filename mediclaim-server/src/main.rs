use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mediclaim_server::{create_router, Environment, MediClaimServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "mediclaim-server", about = "MediClaim API server")]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(environment: Environment, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mediclaim_server={default_level},tower_http=info")));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match environment {
        Environment::Production => builder.json().init(),
        Environment::Development => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Production deployments ship their secrets in .env.production.
    let environment = Environment::from_env();
    let env_file = match environment {
        Environment::Production => ".env.production",
        Environment::Development => ".env",
    };
    let _ = dotenvy::from_filename(env_file);

    let args = Args::parse();
    init_tracing(environment, args.verbose);

    let config = ServerConfig::from_env(args.host, args.port);
    let addr = format!("{}:{}", config.host, config.port);

    let server = MediClaimServer::new(config).await?;
    let app = create_router(server.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "MediClaim API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    server.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown handler");
    }
    info!("Shutting down");
}
