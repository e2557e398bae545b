//! Handlers that monitor the application health.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use pydist_service::CacheStats;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Tracing target for monitoring handlers.
const TRACING_TARGET: &str = "pydist_server::handler::monitors";

/// Response body reporting the application health.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthBody {
    /// Overall status, always `"ok"` while the server is responding.
    pub status: HealthStatus,
    /// Occupancy of the resident archive cache.
    pub cache: CacheStats,
}

/// Overall health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The server is up and serving requests.
    Ok,
}

#[tracing::instrument(skip_all)]
async fn health_status(State(state): State<AppState>) -> Json<HealthBody> {
    let cache = state.service().cache_stats();
    tracing::debug!(target: TRACING_TARGET, entries = cache.entries, "Reporting health");

    Json(HealthBody {
        status: HealthStatus::Ok,
        cache,
    })
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{HealthBody, HealthStatus};
    use crate::handler::test::{create_test_server, serve_upstream, wheel_bytes};

    #[tokio::test]
    async fn test_health_reports_cache_occupancy() {
        let body = wheel_bytes(&[("pkg/a.txt", b"hello")]);
        let base = serve_upstream(StatusCode::OK, body).await;
        let server = create_test_server(&base);

        let res = server.get("/health").await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let health: HealthBody = res.json();
        assert_eq!(health.status, HealthStatus::Ok);
        assert_eq!(health.cache.entries, 0);

        let route = "/project/demo/1.0/packages/ab/cd/ef0123456789/demo-1.0-py3-none-any.whl";
        server.get(route).await.assert_status_ok();

        let health: HealthBody = server.get("/health").await.json();
        assert_eq!(health.cache.entries, 1);
        assert_eq!(health.cache.capacity, 4);
    }
}
