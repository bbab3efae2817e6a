// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// HTTP API
//
// Routes:
// - POST /generate/cost          cost estimate, `{cost}` or `{error}`
// - POST /generate/stream        SSE stream of pipeline events
// - GET  /generate/ai-platforms  platform catalog and process defaults
// - GET  /health

use crate::application::generation::DiagramGenerationService;
use crate::domain::catalog;
use crate::domain::generation::GenerationRequest;
use axum::{
    extract::State,
    http::{header, HeaderName, Method},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Sse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub struct AppState {
    pub service: DiagramGenerationService,
    pub start_time: Instant,
}

pub fn app(service: DiagramGenerationService) -> Router {
    let state = Arc::new(AppState {
        service,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/generate/cost", post(cost_handler))
        .route("/generate/stream", post(stream_handler))
        .route("/generate/ai-platforms", get(ai_platforms_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "cached_repositories": state.service.cache().len(),
    }))
}

async fn cost_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Json<Value> {
    match state.service.estimate_cost(&request).await {
        Ok(cost) => Json(json!({ "cost": cost })),
        Err(e) => {
            warn!(owner = %request.owner, repo = %request.repo, error = %e, "Cost estimate failed");
            Json(json!({ "error": e.to_string() }))
        }
    }
}

async fn stream_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> impl IntoResponse {
    let events = state
        .service
        .generate(request)
        .map(|event| Event::default().json_data(&event));

    (
        [
            (HeaderName::from_static("x-accel-buffering"), "no"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
}

async fn ai_platforms_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let settings = state.service.settings();
    Json(json!({
        "platforms": catalog::available_platforms(),
        "reasoning_effort_options": catalog::reasoning_effort_options(),
        "default_config": {
            "default_platform": settings.default_platform,
            "default_model": settings.default_model,
            "default_reasoning_effort": settings.default_effort,
        },
    }))
}
