/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container, holding:
 * - The notification service (inbox operations and creation)
 * - The dispatcher handle for the realtime loop
 * - The notifier that domain services use to queue notification work
 * - The session signing secret
 *
 * # Thread Safety
 *
 * Every field is a cheap, cloneable handle. Shared mutable state lives
 * behind those handles: the connection registry belongs to the dispatch
 * loop, and stores guard their own data.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::notifications::{NotificationService, Notifier};
use crate::backend::realtime::Dispatcher;

/// Central application state
///
/// Cloned into every request handler; all clones share the same services.
///
/// # Example
///
/// ```rust,no_run
/// use axum::extract::State;
/// use socialhub::backend::notifications::NotificationService;
///
/// async fn handler(State(notifications): State<NotificationService>) {
///     // notifications.get_unread_count(user_id).await
/// }
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Creation and inbox operations
    pub notifications: NotificationService,

    /// Handle to the realtime dispatch loop
    ///
    /// Used by the `/ws` endpoint to register connections and by the stats
    /// endpoint for connection counts.
    pub dispatcher: Dispatcher,

    /// Fire-and-forget notification trigger for domain services
    pub notifier: Notifier,

    /// HMAC secret used to verify session tokens
    pub jwt_secret: Arc<str>,
}

/// Lets handlers take `State<NotificationService>` directly
impl FromRef<AppState> for NotificationService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifications.clone()
    }
}

/// Lets handlers take `State<Dispatcher>` directly
impl FromRef<AppState> for Dispatcher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dispatcher.clone()
    }
}

impl FromRef<AppState> for Notifier {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifier.clone()
    }
}
