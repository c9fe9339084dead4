use crate::{form_handler, predict_handler};
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use predictor::{build_app_context, AppContext, ContextSettings};
use slog::{info, Logger};
use std::sync::Arc;

pub struct AppState {
    pub logger: Logger,
    pub context: AppContext,
}

pub fn build_app_state(
    settings: &ContextSettings,
    logger: Logger,
) -> Result<AppState, anyhow::Error> {
    let context = build_app_context(settings, logger.clone())?;
    Ok(AppState { logger, context })
}

pub fn app(app_state: AppState) -> Router {
    let state = Arc::new(app_state);
    Router::new()
        .route("/", get(form_handler))
        .route("/predict", post(predict_handler))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, log_request))
}

async fn log_request(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    info!(state.logger, "new request, {} {}", method, path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(
        state.logger,
        "response, {} {}, code: {}, time: {}",
        method,
        path,
        response.status().as_str(),
        response_time
    );

    response
}
