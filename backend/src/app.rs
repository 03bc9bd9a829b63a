use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::{any::Any, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::handlers;
use crate::store::{Deadline, ItemStore, StoreResult};

/// Extra time the outer timeout allows past a request's deadline, so store
/// work that gave up at the deadline can still report it.
const DEADLINE_GRACE: Duration = Duration::from_secs(1);

pub struct AppState {
    store: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Runs a store operation on the blocking pool.
    ///
    /// If the returned future is dropped first (client gone, outer timeout),
    /// `deadline` is cancelled and the operation rolls back instead of
    /// committing.
    pub async fn run<T, F>(&self, deadline: &Deadline, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn ItemStore, &Deadline) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let task_deadline = deadline.clone();
        let abandon = CancelOnDrop(Some(deadline));

        let result = tokio::task::spawn_blocking(move || op(store.as_ref(), &task_deadline))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "store task failed");
                ApiError::Internal
            })?;
        abandon.disarm();
        Ok(result?)
    }
}

struct CancelOnDrop<'a>(Option<&'a Deadline>);

impl CancelOnDrop<'_> {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(deadline) = self.0 {
            deadline.cancel();
        }
    }
}

pub fn router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/hello", get(handlers::health::hello))
        .route(
            "/items",
            get(handlers::items::list_items).post(handlers::items::create_item),
        )
        .route(
            "/items/:id",
            get(handlers::items::get_item)
                .put(handlers::items::update_item)
                .delete(handlers::items::delete_item),
        )
        .with_state(state);

    with_layers(routes, request_timeout)
}

fn with_layers(routes: Router, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    routes
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout.saturating_add(DEADLINE_GRACE),
                ))
                .layer(middleware::from_fn_with_state(
                    request_timeout,
                    stamp_deadline,
                )),
        )
        .layer(cors)
}

/// Starts the request's store budget as soon as it arrives.
async fn stamp_deadline(
    State(budget): State<Duration>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(Deadline::after(budget));
    next.run(request).await
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");
    ApiError::Internal.into_response()
}
