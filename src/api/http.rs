use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast::Receiver as BroadcastReceiver;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::Error;
use crate::storage::LiveDataRecord;
use crate::AppState;

pub const WELCOME: &str = "This is the APIConnector \n";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/welcome", get(welcome))
        .route("/api/read", get(read_live_data))
        .route("/api/update", post(update_live_data).fallback(reject_non_post))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// Serve on `listener` until a shutdown signal arrives.
pub async fn run(
    state: Arc<AppState>,
    listener: TcpListener,
    mut shutdown: BroadcastReceiver<()>,
) -> anyhow::Result<()> {
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    Ok(())
}

async fn welcome() -> &'static str {
    WELCOME
}

async fn read_live_data(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<LiveDataRecord>>, Error> {
    tracing::info!("Read live data request");
    let records = state.store.query_all().await.map_err(Error::Select)?;
    Ok(Json(records))
}

// Body is taken raw so decode failures follow our status contract, not axum's rejections.
async fn update_live_data(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, Error> {
    tracing::info!("Update live data request");
    let record: LiveDataRecord = serde_json::from_slice(&body)?;
    state.store.upsert(&record).await.map_err(Error::Insert)?;
    Ok(StatusCode::OK)
}

async fn reject_non_post() -> Error {
    Error::MethodNotAllowed
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!("Recovered from handler panic: {}", detail);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
