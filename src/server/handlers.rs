use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

use crate::analyzers::correlation::{calculate_correlation, raw_state_correlations};
use crate::models::Dataset;
use crate::processors::columns::REGION;
use crate::processors::vectors::{vectors_by_season, vectors_by_year, vectors_static};
use crate::processors::views;
use crate::processors::wind_rose::{animated_wind_rose, wind_rose_data, WindRoseKind};
use crate::server::AppState;

/// Error body returned to the browser as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!("Request task failed: {}", err);
        ApiError::internal("Internal server error")
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        error!("Response serialization failed: {}", err);
        ApiError::internal("Internal server error")
    }
}

/// Body of the per-state POST routes.
#[derive(Debug, Default, Deserialize)]
pub struct StateRequest {
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WindRoseQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

type ApiResult = Result<Response, ApiError>;

/// Run `build` against the dataset on the blocking pool and return its
/// serialized output as a JSON response.
async fn respond<F>(state: &AppState, build: F) -> ApiResult
where
    F: FnOnce(&Dataset) -> serde_json::Result<Vec<u8>> + Send + 'static,
{
    let dataset = Arc::clone(&state.dataset);
    let body = tokio::task::spawn_blocking(move || build(&dataset)).await??;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub async fn states(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&d.unique_states())).await
}

pub async fn us_data(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(d.records())).await
}

pub async fn state_data(
    State(state): State<AppState>,
    Json(request): Json<StateRequest>,
) -> ApiResult {
    debug!("state_data for {:?}", request.state);
    respond(&state, move |d| match request.state.as_deref() {
        Some(name) => serde_json::to_vec(&d.state_records(name)),
        None => serde_json::to_vec(&Vec::<()>::new()),
    })
    .await
}

pub async fn correlation_data(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| {
        serde_json::to_vec(&calculate_correlation(d.records(), &[REGION]))
    })
    .await
}

pub async fn state_averages(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| {
        serde_json::to_vec(&views::state_averages_with_trend(d.records()))
    })
    .await
}

pub async fn seasonal_averages(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&views::seasonal_averages(d.records()))).await
}

pub async fn us_combo_data(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&views::us_combo(d.records()))).await
}

pub async fn state_comparison(
    State(state): State<AppState>,
    Json(request): Json<StateRequest>,
) -> ApiResult {
    respond(&state, move |d| {
        serde_json::to_vec(&views::state_comparison(
            d.records(),
            request.state.as_deref(),
        ))
    })
    .await
}

pub async fn treemap_data(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&views::treemap(d.records()))).await
}

pub async fn wind_rose(
    State(state): State<AppState>,
    Json(request): Json<StateRequest>,
) -> ApiResult {
    respond(&state, move |d| {
        serde_json::to_vec(&wind_rose_data(d, request.state.as_deref()))
    })
    .await
}

pub async fn animated_wind_rose_data(
    State(state): State<AppState>,
    Query(query): Query<WindRoseQuery>,
) -> ApiResult {
    let kind = match query.kind.as_deref() {
        None => WindRoseKind::default(),
        Some(kind) => kind
            .parse::<WindRoseKind>()
            .map_err(|_| ApiError::bad_request("Invalid data type"))?,
    };
    respond(&state, move |d| serde_json::to_vec(&animated_wind_rose(d, kind))).await
}

pub async fn choropleth_data(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&views::choropleth(d.records()))).await
}

pub async fn animated_choropleth_data(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&views::animated_co(d.records()))).await
}

pub async fn co_wind_correlation(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&raw_state_correlations(d.records()))).await
}

pub async fn wind_vectors_static(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&vectors_static(d.records()))).await
}

pub async fn wind_vectors_animated(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&vectors_by_year(d.records()))).await
}

pub async fn wind_vectors_seasonal(State(state): State<AppState>) -> ApiResult {
    respond(&state, |d| serde_json::to_vec(&vectors_by_season(d.records()))).await
}
