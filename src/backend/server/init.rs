/**
 * Server Initialization
 *
 * This module is the composition root: it builds every long-lived service
 * once, wires them together and hands back the router plus the handles
 * needed to stop them.
 *
 * # Initialization Process
 *
 * 1. Connect to the database if one is configured
 * 2. Pick the notification store and directory (Postgres or in-memory)
 * 3. Start the dispatch loop
 * 4. Start the background task pool
 * 5. Build the notification service, notifier and `AppState`
 * 6. Create the router
 *
 * # Shutdown
 *
 * `App::shutdown()` drains the background pool first, so queued
 * notifications still reach the dispatcher, then stops the dispatch loop,
 * which closes every live connection.
 */

use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;

use crate::backend::notifications::{
    Directory, MemoryDirectory, MemoryNotificationStore, NotificationService, NotificationStore,
    Notifier, PgDirectory, PgNotificationStore,
};
use crate::backend::realtime::Dispatcher;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::tasks::BackgroundTasks;

/// A fully wired application
pub struct App {
    /// Router ready to serve
    pub router: Router<()>,
    /// Shared state, for callers that need the services directly
    pub state: AppState,
    tasks: BackgroundTasks,
    dispatch_loop: JoinHandle<()>,
}

impl App {
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.state.dispatcher
    }

    pub fn notifier(&self) -> &Notifier {
        &self.state.notifier
    }

    /// Drain background work, then close every connection
    pub async fn shutdown(self) {
        tracing::info!("Shutting down notification core");
        self.tasks.shutdown().await;
        self.state.dispatcher.stop();
        if let Err(e) = self.dispatch_loop.await {
            tracing::error!("Dispatch loop ended abnormally: {}", e);
        }
    }
}

/// Create and configure the application from `config`
///
/// Storage comes from `DATABASE_URL` when it is set and reachable; otherwise
/// the in-memory store and an empty in-memory directory are used.
pub async fn create_app(config: ServerConfig) -> App {
    let db_pool = load_database(config.database_url.as_deref()).await;

    let (store, directory): (Arc<dyn NotificationStore>, Arc<dyn Directory>) = match &db_pool {
        Some(pool) => (
            Arc::new(PgNotificationStore::new(pool.clone())),
            Arc::new(PgDirectory::new(pool.clone())),
        ),
        None => (
            Arc::new(MemoryNotificationStore::new()),
            Arc::new(MemoryDirectory::new()),
        ),
    };

    create_app_with(config, store, directory)
}

/// Wire the application around explicit storage backends
///
/// Must be called from within a Tokio runtime.
pub fn create_app_with(
    config: ServerConfig,
    store: Arc<dyn NotificationStore>,
    directory: Arc<dyn Directory>,
) -> App {
    tracing::info!(store = store.backend_name(), "Initializing notification core");

    let (dispatcher, dispatch_loop) = Dispatcher::start();
    let tasks = BackgroundTasks::start(config.worker_count, config.task_queue_capacity);

    let notifications = NotificationService::new(store, directory, dispatcher.clone());
    let notifier = Notifier::new(notifications.clone(), tasks.clone());

    let state = AppState {
        notifications,
        dispatcher,
        notifier,
        jwt_secret: Arc::from(config.jwt_secret.as_str()),
    };

    let router = create_router(state.clone());
    tracing::info!("Router configured");

    App {
        router,
        state,
        tasks,
        dispatch_loop,
    }
}
