/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Layers
 *
 * Every request passes through `TraceLayer` (one span per request, logged
 * through `tracing`) and a permissive `CorsLayer` so browser clients on
 * other origins can reach the API.
 */

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::realtime::ws_upgrade;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// 1. **Health**: `GET /health`
/// 2. **WebSocket**: `GET /ws`
/// 3. **API Routes**: notification inbox and realtime stats
/// 4. **Fallback Handler**: 404 JSON body
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ws", get(ws_upgrade));

    let router = configure_api_routes(router, &app_state);

    let router = router.fallback(|| async {
        crate::backend::error::BackendError::not_found("route not found")
    });

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
