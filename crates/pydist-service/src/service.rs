//! Archive access orchestration.

use std::sync::Arc;

use bytes::Bytes;
use pydist_archive::{ArchiveError, ArchiveFormat, ArchiveReader, FileEntry};
use pydist_cache::{CacheStats, ResidentCache};
use pydist_fetch::FetchClient;
use tokio_stream::wrappers::ReceiverStream;

use crate::TRACING_TARGET;
use crate::config::ServiceConfig;
use crate::error::{Error, ServiceResult};
use crate::stream::ContentStream;

/// Chunks buffered between the decoding task and the stream consumer.
const STREAM_CHANNEL_DEPTH: usize = 8;

/// Inner service state shared by all clones.
struct ServiceInner {
    fetcher: FetchClient,
    cache: ResidentCache<ArchiveReader>,
    config: ServiceConfig,
}

/// Uniform access to the contents of remote distribution archives.
///
/// A request names an archive by its full download URL. The URL suffix
/// decides the format up front: `.whl`, `.egg`, and `.zip` open as zip
/// archives, `.tar.gz` as gzipped tarballs, and anything else is rejected
/// without a network call. Opened archives stay resident in a bounded LRU
/// cache keyed by URL, so repeat requests skip the download entirely.
///
/// Archive decoding is blocking, local I/O and runs on the blocking thread
/// pool; the async surface never stalls the runtime on it.
#[derive(Clone)]
pub struct AccessService {
    inner: Arc<ServiceInner>,
}

impl std::fmt::Debug for AccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessService")
            .field("config", &self.inner.config)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl AccessService {
    /// Creates a service around a download client.
    pub fn new(fetcher: FetchClient, config: ServiceConfig) -> Self {
        let cache = ResidentCache::new(config.capacity());
        Self {
            inner: Arc::new(ServiceInner {
                fetcher,
                cache,
                config,
            }),
        }
    }

    /// Snapshot of the resident archive cache occupancy.
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Lists every file in the archive at `url`.
    ///
    /// # Errors
    ///
    /// Fails with the taxonomy in [`Error`]; see [`AccessService::reader_for`]
    /// for how the archive is resolved.
    pub async fn list_files(&self, url: &str) -> ServiceResult<Vec<FileEntry>> {
        let reader = self.reader_for(url).await?;
        self.run_blocking(url, reader, ArchiveReader::list_files).await
    }

    /// Uncompressed size of the file at `path` inside the archive at `url`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] when no file member has that path, or
    /// any of the archive resolution errors.
    pub async fn file_size(&self, url: &str, path: &str) -> ServiceResult<u64> {
        let reader = self.reader_for(url).await?;
        let path = path.to_owned();
        self.run_blocking(url, reader, move |reader| reader.file_size(&path))
            .await
    }

    /// Full decompressed contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AccessService::file_size`].
    pub async fn read_file(&self, url: &str, path: &str) -> ServiceResult<Bytes> {
        let reader = self.reader_for(url).await?;
        let path = path.to_owned();
        self.run_blocking(url, reader, move |reader| reader.read_all(&path))
            .await
    }

    /// Streams the file at `path` in chunks of the configured size.
    ///
    /// Missing members fail here, before the stream exists; once a
    /// [`ContentStream`] is returned, its chunks concatenate to exactly
    /// [`ContentStream::len`] bytes unless decoding fails mid-member.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AccessService::file_size`].
    pub async fn stream_file(&self, url: &str, path: &str) -> ServiceResult<ContentStream> {
        let reader = self.reader_for(url).await?;

        let len = {
            let reader = Arc::clone(&reader);
            let path = path.to_owned();
            self.run_blocking(url, reader, move |reader| reader.file_size(&path))
                .await?
        };

        let chunk_size = self.inner.fetcher.config().chunk_size;
        let (tx, rx) = tokio::sync::mpsc::channel(STREAM_CHANNEL_DEPTH);
        let task_url = url.to_owned();
        let task_path = path.to_owned();
        tokio::task::spawn_blocking(move || {
            let result = reader.read_chunks(&task_path, chunk_size, |chunk| {
                tx.blocking_send(Ok(chunk))
                    .map_err(|_| ArchiveError::Io(std::io::Error::other("stream consumer dropped")))
            });
            if let Err(err) = result {
                let _ = tx.blocking_send(Err(Error::from_archive(&task_url, err)));
            }
        });

        Ok(ContentStream::new(len, ReceiverStream::new(rx)))
    }

    /// Resolves the resident reader for `url`, downloading and opening the
    /// archive on a cache miss.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnsupportedFormat`] before any network call for
    /// unrecognized suffixes; download failures surface as
    /// [`Error::Upstream`], [`Error::TooLarge`], or [`Error::FetchFailed`];
    /// unparseable payloads as [`Error::Decode`]. A failed miss leaves the
    /// cache untouched.
    async fn reader_for(&self, url: &str) -> ServiceResult<Arc<ArchiveReader>> {
        let format =
            ArchiveFormat::from_url(url).ok_or_else(|| Error::unsupported_format(url))?;
        let inner = &self.inner;

        inner
            .cache
            .get_or_try_insert(url, || async move {
                tracing::debug!(
                    target: TRACING_TARGET,
                    url = %url,
                    format = %format,
                    "Downloading archive"
                );

                let source = inner
                    .fetcher
                    .fetch(url)
                    .await
                    .map_err(|err| Error::from_fetch(url, err))?;

                tokio::task::spawn_blocking(move || ArchiveReader::open(format, source))
                    .await
                    .unwrap_or_else(|err| Err(ArchiveError::Io(std::io::Error::other(err))))
                    .map_err(|err| Error::from_archive(url, err))
            })
            .await
    }

    /// Runs a blocking archive operation on the blocking thread pool.
    async fn run_blocking<T, F>(
        &self,
        url: &str,
        reader: Arc<ArchiveReader>,
        op: F,
    ) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&ArchiveReader) -> Result<T, ArchiveError> + Send + 'static,
    {
        tokio::task::spawn_blocking(move || op(&reader))
            .await
            .unwrap_or_else(|err| Err(ArchiveError::Io(std::io::Error::other(err))))
            .map_err(|err| Error::from_archive(url, err))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tokio_stream::StreamExt;

    use super::*;
    use crate::error::ErrorKind;

    fn wheel_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn sdist_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, *name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Serves `body` with `status` for every path and counts requests.
    async fn serve_upstream(status: StatusCode, body: Vec<u8>) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new().route(
            "/{*name}",
            get({
                let hits = Arc::clone(&hits);
                move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let body = body.clone();
                    async move { (status, body) }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}"), hits)
    }

    fn make_service(cache_capacity: usize, chunk_size: usize) -> AccessService {
        let fetcher = FetchClient::new(
            pydist_fetch::FetchConfig::default().with_chunk_size(chunk_size),
        )
        .unwrap();
        AccessService::new(
            fetcher,
            ServiceConfig::default().with_cache_capacity(cache_capacity),
        )
    }

    #[tokio::test]
    async fn test_list_files_downloads_once_and_caches() {
        let body = wheel_bytes(&[("pkg/__init__.py", b"x = 1\n"), ("pkg/data.bin", b"\x00")]);
        let (base, hits) = serve_upstream(StatusCode::OK, body).await;
        let service = make_service(4, 4096);
        let url = format!("{base}/pkg-1.0-py3-none-any.whl");

        let mut names: Vec<String> = service
            .list_files(&url)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["pkg/__init__.py", "pkg/data.bin"]);

        service.list_files(&url).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(service.cache_stats().entries, 1);
    }

    #[tokio::test]
    async fn test_unrecognized_suffix_never_touches_network() {
        let (base, hits) = serve_upstream(StatusCode::OK, Vec::new()).await;
        let service = make_service(4, 4096);

        let err = service
            .list_files(&format!("{base}/pkg-1.0.tar"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(service.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_upstream_status_surfaces_and_is_not_cached() {
        let (base, hits) = serve_upstream(StatusCode::NOT_FOUND, Vec::new()).await;
        let service = make_service(4, 4096);
        let url = format!("{base}/pkg-1.0-py3-none-any.whl");

        let err = service.list_files(&url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.upstream_status(), Some(404));
        assert_eq!(service.cache_stats().entries, 0);

        // Failed misses leave nothing behind, so a retry fetches again.
        service.list_files(&url).await.unwrap_err();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_file_size_and_read_file() {
        let body = wheel_bytes(&[("pkg/data.txt", b"hello world")]);
        let (base, _hits) = serve_upstream(StatusCode::OK, body).await;
        let service = make_service(4, 4096);
        let url = format!("{base}/pkg-1.0-py3-none-any.whl");

        assert_eq!(service.file_size(&url, "pkg/data.txt").await.unwrap(), 11);
        assert_eq!(
            service.read_file(&url, "pkg/data.txt").await.unwrap(),
            b"hello world".as_slice()
        );
    }

    #[tokio::test]
    async fn test_missing_member_is_not_found_across_operations() {
        let body = wheel_bytes(&[("pkg/data.txt", b"hello world")]);
        let (base, _hits) = serve_upstream(StatusCode::OK, body).await;
        let service = make_service(4, 4096);
        let url = format!("{base}/pkg-1.0-py3-none-any.whl");

        let err = service.file_size(&url, "absent.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = service.read_file(&url, "absent.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = service.stream_file(&url, "absent.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_stream_file_yields_configured_chunks() {
        let body = sdist_bytes(&[("a/b.txt", b"hello")]);
        let (base, _hits) = serve_upstream(StatusCode::OK, body).await;
        let service = make_service(4, 2);
        let url = format!("{base}/pkg-1.0.tar.gz");

        let mut stream = service.stream_file(&url, "a/b.txt").await.unwrap();
        assert_eq!(stream.len(), 5);

        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.unwrap());
        }
        assert_eq!(chunks, ["he", "ll", "o"]);
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_not_cached() {
        let (base, hits) = serve_upstream(StatusCode::OK, b"not an archive".to_vec()).await;
        let service = make_service(4, 4096);
        let url = format!("{base}/pkg-1.0-py3-none-any.whl");

        let err = service.list_files(&url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(service.cache_stats().entries, 0);

        service.list_files(&url).await.unwrap_err();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_eviction_refetches_displaced_archive() {
        let body = wheel_bytes(&[("pkg/data.txt", b"hi")]);
        let (base, hits) = serve_upstream(StatusCode::OK, body).await;
        let service = make_service(1, 4096);
        let first = format!("{base}/first-1.0-py3-none-any.whl");
        let second = format!("{base}/second-1.0-py3-none-any.whl");

        service.list_files(&first).await.unwrap();
        service.list_files(&second).await.unwrap();
        assert_eq!(service.cache_stats().entries, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        service.list_files(&first).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
