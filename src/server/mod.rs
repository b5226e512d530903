pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::models::Dataset;
use crate::settings::ServerSettings;

/// Shared by every handler. The dataset is never mutated after load.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/states", get(handlers::states))
        .route("/us_data", get(handlers::us_data))
        .route("/state_data", post(handlers::state_data))
        .route("/correlation_data", get(handlers::correlation_data))
        .route("/state_averages", get(handlers::state_averages))
        .route("/seasonal_averages", get(handlers::seasonal_averages))
        .route("/us_combo_data", get(handlers::us_combo_data))
        .route("/state_comparison", post(handlers::state_comparison))
        .route("/treemap_data", get(handlers::treemap_data))
        .route("/wind_rose", post(handlers::wind_rose))
        .route("/wind_rose/animated", get(handlers::animated_wind_rose_data))
        .route("/choropleth_data", get(handlers::choropleth_data))
        .route(
            "/choropleth_data/animated",
            get(handlers::animated_choropleth_data),
        )
        .route("/co_wind_correlation", get(handlers::co_wind_correlation))
        .route("/wind_vectors/static", get(handlers::wind_vectors_static))
        .route("/wind_vectors/animated", get(handlers::wind_vectors_animated))
        .route("/wind_vectors/seasonal", get(handlers::wind_vectors_seasonal));

    let app = match static_dir {
        Some(dir) => {
            let page = ["w209.html", "index.html"]
                .iter()
                .map(|name| dir.join(name))
                .find(|path| path.is_file());
            let api = match page {
                Some(page) => api.route_service("/", ServeFile::new(page)),
                None => api,
            };
            api.fallback_service(ServeDir::new(dir))
        }
        None => api,
    };

    app.with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(settings: &ServerSettings, dataset: Arc<Dataset>) -> Result<()> {
    let app = router(AppState::new(dataset), settings.static_dir.as_deref());

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Serving on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
