//! JSON HTTP surface over the storage port.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use wanderlist_core::{normalize, Destination, DestinationFilter, DestinationId};

use crate::{
    auth::auth_middleware,
    config::{AuthConfig, Config},
    error::AppError,
    storage::{StorageError, StoragePort},
    telemetry,
};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StoragePort>,
    pub metrics: PrometheusHandle,
}

/// Runs a blocking storage call off the async executor and counts it.
async fn run_storage<T, F>(state: &AppState, operation: &'static str, f: F) -> Result<T, AppError>
where
    F: FnOnce(&dyn StoragePort) -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    let storage = state.storage.clone();
    let result = tokio::task::spawn_blocking(move || f(storage.as_ref()))
        .await
        .map_err(|e| AppError::Internal(format!("storage task failed: {}", e)))?;
    telemetry::record_operation(operation, result.is_ok());
    Ok(result?)
}

pub fn router(state: AppState, auth: Arc<AuthConfig>) -> Router {
    let protected: Router<AppState> = Router::new()
        .route("/destinations", get(list_destinations).put(save_destination))
        .route(
            "/destinations/:id",
            get(get_destination).delete(delete_destination),
        )
        .route("/import", post(import))
        .route("/export", get(export))
        .route("/migrate", post(migrate))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(auth));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .merge(protected)
        .with_state(state)
}

pub async fn serve(config: &Config, storage: Box<dyn StoragePort>) -> Result<(), AppError> {
    let metrics = telemetry::install_metrics().map_err(|e| AppError::Internal(e.to_string()))?;
    let state = AppState {
        storage: Arc::from(storage),
        metrics,
    };
    let app = router(state, Arc::new(config.auth.clone()));

    let addr = config
        .listen_addr()
        .map_err(|e| AppError::Internal(format!("invalid listen address: {}", e)))?;
    tracing::info!(%addr, auth = config.auth.enabled, "API listening");

    axum::Server::try_bind(&addr)
        .map_err(|e| AppError::Internal(format!("cannot bind {}: {}", addr, e)))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "backend": state.storage.backend_name() }))
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

async fn list_destinations(
    State(state): State<AppState>,
    Query(filter): Query<DestinationFilter>,
) -> Result<Json<Vec<Destination>>, AppError> {
    let all = run_storage(&state, "get_all", |s| s.get_all()).await?;
    Ok(Json(filter.apply(&all)))
}

async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Destination>, AppError> {
    let id = DestinationId(id);
    run_storage(&state, "get_one", move |s| s.get_one(id))
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(id))
}

async fn save_destination(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Destination>, AppError> {
    let destination = normalize(&body);
    let saved = run_storage(&state, "save", move |s| s.save(&destination)).await?;
    Ok(Json(saved))
}

async fn delete_destination(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let deleted = run_storage(&state, "delete", move |s| s.delete(DestinationId(id))).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

async fn import(State(state): State<AppState>, body: String) -> Result<Json<Value>, AppError> {
    let imported = run_storage(&state, "import_all", move |s| s.import_all(&body)).await?;
    Ok(Json(json!({ "imported": imported.len() })))
}

async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let document = run_storage(&state, "export_all", |s| s.export_all()).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], document))
}

async fn migrate(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let migrated = run_storage(&state, "migrate_from_legacy", |s| s.migrate_from_legacy()).await?;
    Ok(Json(json!({ "migrated": migrated })))
}
