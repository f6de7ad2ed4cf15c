//! File server hit counting.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Thread-safe count of requests served under `/app`.
///
/// Owned by the server config and shared through `Arc`, so every app (and
/// every test) gets its own counter.
#[derive(Debug, Default)]
pub struct HitCounter {
    hits: AtomicU64,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware counting every request that reaches the wrapped routes.
pub async fn count_hits(
    State(counter): State<Arc<HitCounter>>,
    request: Request,
    next: Next,
) -> Response {
    counter.increment();
    next.run(request).await
}
