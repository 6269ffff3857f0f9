use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use anyhow::Result;
use std::collections::HashSet;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::GatewayConfig;
use crate::error::RequestProcessingError;
use crate::translate::{ResponseDocument, Translator};

/// Raw query pairs in request order, repeated names included.
type Params = Query<Vec<(String, String)>>;

/// Keeps the first value of every name, in first-seen order.
pub fn first_value_per_name(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|(name, _)| seen.insert(name.clone()))
        .collect()
}

pub struct ServerError(RequestProcessingError);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Tax Gateway Error: {}", self.0),
        );
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<RequestProcessingError> for ServerError {
    fn from(err: RequestProcessingError) -> Self {
        Self(err)
    }
}

pub fn router(translator: Translator) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/{year}", get(year_handler))
        .route("/{year}/{month}", get(month_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(translator)
}

pub async fn run_server(config: &GatewayConfig, translator: Translator) -> Result<()> {
    let app = router(translator);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("🚀 Tax Gateway listening at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Tax Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn year_handler(
    State(translator): State<Translator>,
    Path(year): Path<i32>,
    Query(params): Params,
) -> Result<Json<ResponseDocument>, ServerError> {
    let document = translator.dispatch(year, 0, first_value_per_name(params)).await?;
    Ok(Json(document))
}

async fn month_handler(
    State(translator): State<Translator>,
    Path((year, month)): Path<(i32, u32)>,
    Query(params): Params,
) -> Result<Json<ResponseDocument>, ServerError> {
    let document = translator.dispatch(year, month, first_value_per_name(params)).await?;
    Ok(Json(document))
}
