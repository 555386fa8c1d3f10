mod platform;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    // The platform is the portal's only data source; refuse to start without it.
    let platform = platform::HttpPlatform::from_env().expect("platform client init failed");
    tracing::info!(base_url = platform.base_url(), "platform client initialized");

    let state = state::AppState::new(std::sync::Arc::new(platform));

    // Evicts expired portal sessions for the process lifetime.
    let _sweeper = services::session::spawn_session_sweeper(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "portal listening");
    axum::serve(listener, app).await.expect("server failed");
}
