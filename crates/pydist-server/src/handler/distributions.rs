//! Handlers that list and read files inside distribution archives.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use pydist_service::FileEntry;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// Tracing target for distribution handlers.
const TRACING_TARGET: &str = "pydist_server::handler::distributions";

/// Joins upstream download path segments onto the configured base URL.
fn download_url(base: &Url, first: &str, second: &str, rest: &str, distname: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    format!("{base}/{first}/{second}/{rest}/{distname}")
}

/// Path parameters addressing a single distribution archive.
///
/// The `name` and `version` route segments are descriptive only and are not
/// captured here; extraction ignores parameters without a matching field.
#[derive(Debug, Clone, Deserialize)]
struct DistPath {
    /// First segment of the upstream download path.
    first: String,
    /// Second segment of the upstream download path.
    second: String,
    /// Remaining hash segment of the upstream download path.
    rest: String,
    /// Archive file name, e.g. `demo-1.0-py3-none-any.whl`.
    distname: String,
}

impl DistPath {
    /// Returns the upstream URL this distribution downloads from.
    fn download_url(&self, base: &Url) -> String {
        download_url(base, &self.first, &self.second, &self.rest, &self.distname)
    }
}

/// Path parameters addressing one file inside a distribution archive.
#[derive(Debug, Clone, Deserialize)]
struct FilePath {
    /// First segment of the upstream download path.
    first: String,
    /// Second segment of the upstream download path.
    second: String,
    /// Remaining hash segment of the upstream download path.
    rest: String,
    /// Archive file name, e.g. `demo-1.0-py3-none-any.whl`.
    distname: String,
    /// Path of the file inside the archive.
    path: String,
}

impl FilePath {
    /// Returns the upstream URL this distribution downloads from.
    fn download_url(&self, base: &Url) -> String {
        download_url(base, &self.first, &self.second, &self.rest, &self.distname)
    }
}

/// Response body reporting the size of one archived file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FileSizeBody {
    /// Uncompressed size in bytes.
    pub size: u64,
}

#[tracing::instrument(skip_all, fields(distname = %dist.distname))]
async fn list_distribution(
    State(state): State<AppState>,
    Path(dist): Path<DistPath>,
) -> Result<Json<Vec<FileEntry>>, AppError> {
    let url = dist.download_url(state.upstream_base());
    tracing::debug!(target: TRACING_TARGET, url = %url, "Listing distribution contents");

    let entries = state.service().list_files(&url).await?;
    Ok(Json(entries))
}

#[tracing::instrument(skip_all, fields(distname = %file.distname, path = %file.path))]
async fn file_size(
    State(state): State<AppState>,
    Path(file): Path<FilePath>,
) -> Result<Json<FileSizeBody>, AppError> {
    let url = file.download_url(state.upstream_base());
    tracing::debug!(target: TRACING_TARGET, url = %url, path = %file.path, "Reporting file size");

    let size = state.service().file_size(&url, &file.path).await?;
    Ok(Json(FileSizeBody { size }))
}

#[tracing::instrument(skip_all, fields(distname = %file.distname, path = %file.path))]
async fn file_contents(
    State(state): State<AppState>,
    Path(file): Path<FilePath>,
) -> Result<Response, AppError> {
    let url = file.download_url(state.upstream_base());
    tracing::debug!(target: TRACING_TARGET, url = %url, path = %file.path, "Streaming file contents");

    let stream = state.service().stream_file(&url, &file.path).await?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, stream.len())
        .body(Body::from_stream(stream))
        .map_err(AppError::internal)
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/project/{name}/{version}/packages/{first}/{second}/{rest}/{distname}",
            get(list_distribution),
        )
        .route(
            "/project/{name}/{version}/packages/{first}/{second}/{rest}/{distname}/sizes/{*path}",
            get(file_size),
        )
        .route(
            "/project/{name}/{version}/packages/{first}/{second}/{rest}/{distname}/files/{*path}",
            get(file_contents),
        )
}
