/**
 * API Route Handlers
 *
 * This module wires the REST endpoints under `/api/v1`.
 *
 * # Routes
 *
 * ## Notifications (authenticated)
 * - `GET    /api/v1/notifications` - List with `type`, `isRead`, `page`, `limit`
 * - `GET    /api/v1/notifications/unread/count` - Unread count
 * - `PUT    /api/v1/notifications/read` - Mark a list of ids as read
 * - `PUT    /api/v1/notifications/read-all` - Mark everything as read
 * - `PUT    /api/v1/notifications/{id}/read` - Mark one as read
 * - `DELETE /api/v1/notifications/{id}` - Delete one
 * - `DELETE /api/v1/notifications` - Delete all
 *
 * ## Realtime (public)
 * - `GET /api/v1/realtime/stats` - Connection counts
 */

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};

use crate::backend::middleware::auth_middleware;
use crate::backend::notifications::handlers::{
    delete_all_notifications, delete_notification, list_notifications, mark_all_as_read,
    mark_as_read, mark_multiple_as_read, unread_count,
};
use crate::backend::realtime::realtime_stats;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Authentication
///
/// Every notification route requires `Authorization: Bearer <token>`;
/// `auth_middleware` rejects the request with 401 before the handler runs.
/// The stats route is public.
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let notifications = Router::new()
        .route(
            "/api/v1/notifications",
            get(list_notifications).delete(delete_all_notifications),
        )
        .route("/api/v1/notifications/unread/count", get(unread_count))
        .route("/api/v1/notifications/read", put(mark_multiple_as_read))
        .route("/api/v1/notifications/read-all", put(mark_all_as_read))
        .route("/api/v1/notifications/{id}/read", put(mark_as_read))
        .route("/api/v1/notifications/{id}", delete(delete_notification))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    router
        .merge(notifications)
        .route("/api/v1/realtime/stats", get(realtime_stats))
}
