//! All `axum::`[`Router`]s with related handlers.
//!
//! [`Router`]: axum::Router

mod distributions;
mod monitors;

use axum::Router;
use axum::response::{IntoResponse, Response};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
pub use crate::handler::distributions::FileSizeBody;
pub use crate::handler::monitors::{HealthBody, HealthStatus};
use crate::state::AppState;

#[inline]
async fn fallback() -> Response {
    AppError::route_not_found().into_response()
}

/// Returns a [`Router`] with all application routes.
///
/// Request logging comes from [`TraceLayer`]'s default spans, which record
/// method, path, status, and latency for every request.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .merge(distributions::routes())
        .merge(monitors::routes())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod test {
    use std::io::{Cursor, Write};

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum_test::TestServer;
    use pydist_fetch::{FetchClient, FetchConfig};
    use pydist_service::{AccessService, ServiceConfig};
    use url::Url;

    use super::routes;
    use crate::state::AppState;

    /// Builds a wheel fixture in memory.
    pub fn wheel_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Serves `body` with `status` for every path on an ephemeral port.
    pub async fn serve_upstream(status: StatusCode, body: Vec<u8>) -> String {
        let router = Router::new().route(
            "/{*name}",
            get(move || {
                let body = body.clone();
                async move { (status, body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Returns a new [`TestServer`] downloading from the given upstream.
    pub fn create_test_server(upstream_base: &str) -> TestServer {
        let fetcher = FetchClient::new(FetchConfig::default().with_chunk_size(3)).unwrap();
        let service = AccessService::new(fetcher, ServiceConfig::default());
        let state = AppState::new(service, Url::parse(upstream_base).unwrap());
        TestServer::new(routes(state)).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route_returns_json_not_found() {
        let server = create_test_server("http://127.0.0.1:9");

        let res = server.get("/nope").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let body: crate::ErrorBody = res.json();
        assert_eq!(body.error.code, "NOT_FOUND");
    }
}
