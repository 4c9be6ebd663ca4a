//! Per-request database query counting.
//!
//! Diesel's instrumentation hook bumps a task-local counter for every query
//! started on a connection. The counter is installed per request by
//! [`query_counting_middleware`]; queries issued outside a request are only
//! logged.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use diesel::connection::{Instrumentation, InstrumentationEvent};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

tokio::task_local! {
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Get the current database query count for this request, if available.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

fn record_query() {
    let _ = DB_QUERY_COUNTER.try_with(|counter| {
        counter.fetch_add(1, Ordering::Relaxed);
    });
}

/// Diesel instrumentation that traces each statement and counts it against
/// the current request.
pub struct QueryCounter;

impl Instrumentation for QueryCounter {
    fn on_connection_event(&mut self, event: InstrumentationEvent<'_>) {
        match event {
            InstrumentationEvent::StartQuery { query, .. } => {
                tracing::trace!(target: "db.query", "{}", query);
                record_query();
            }
            InstrumentationEvent::FinishQuery {
                error: Some(error), ..
            } => {
                tracing::debug!(target: "db.query", "query failed: {}", error);
            }
            _ => {}
        }
    }
}

/// Install [`QueryCounter`] on every connection established from now on.
pub fn install_query_instrumentation() -> diesel::QueryResult<()> {
    diesel::connection::set_default_instrumentation(query_counter)
}

fn query_counter() -> Option<Box<dyn Instrumentation>> {
    Some(Box::new(QueryCounter))
}

/// Middleware that initializes the per-request database query counter.
///
/// Must be layered outside the handlers so the counter covers the whole request.
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

/// Adds `X-DB-Query-Count` to responses when `TRACK_DB_QUERY_COUNT=1`.
pub async fn db_query_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if std::env::var("TRACK_DB_QUERY_COUNT")
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        if let Some(count) = get_query_count() {
            if let Ok(value) = axum::http::header::HeaderValue::from_str(&count.to_string()) {
                response.headers_mut().insert("X-DB-Query-Count", value);
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counter_only_exists_inside_scope() {
        assert_eq!(get_query_count(), None);

        let counter = Arc::new(AtomicU32::new(0));
        let seen = DB_QUERY_COUNTER
            .scope(counter, async {
                record_query();
                record_query();
                get_query_count()
            })
            .await;
        assert_eq!(seen, Some(2));
    }

    #[test]
    fn test_record_outside_request_is_noop() {
        record_query();
        assert_eq!(get_query_count(), None);
    }
}
