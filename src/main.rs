use clap::Parser; // for cli
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tutor_gateway::config::Args;
use tutor_gateway::rate_limit::InMemoryRateLimiter;
use tutor_gateway::state::AppState;
use tutor_gateway::upstream::ChatCompletionClient;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // upstream client gets the same budget as a whole invocation
    let generator = ChatCompletionClient::new(
        args.upstream_url.clone(),
        args.api_key.clone(),
        args.model.clone(),
        args.invocation_timeout(),
    )?;
    let rate_limiter = InMemoryRateLimiter::new(args.rate_limit, args.rate_window());

    // creating shared state
    let state = Arc::new(
        AppState::new(Arc::new(generator), Arc::new(rate_limiter))
            .with_identity_header(args.identity_header.clone())
            .with_invocation_timeout(args.invocation_timeout()),
    );

    let app = tutor_gateway::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Gateway running on http://localhost:{}", args.port);
    info!("Forwarding to {} (model {})", args.upstream_url, args.model);
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    info!("Invocation timeout: {} seconds", args.timeout_seconds);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
