use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::utils::config::get_config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Without GRAPHON_API_KEY the server still starts, reporting itself degraded
    let api_state = ApiState::new(&config)?;

    let app = build_app(&api_state);

    let serve_address = format!("{}:{}", config.http_host, config.http_port);
    info!("Starting server listening on {}", serve_address);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_app(api_state: &ApiState) -> Router {
    api_routes(api_state).with_state(api_state.clone())
}
