//! Shared application state.

use pydist_service::AccessService;
use url::Url;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: AccessService,
    upstream_base: Url,
}

impl AppState {
    /// Creates the application state.
    pub fn new(service: AccessService, upstream_base: Url) -> Self {
        Self {
            service,
            upstream_base,
        }
    }

    /// The archive access service.
    pub const fn service(&self) -> &AccessService {
        &self.service
    }

    /// Base URL that download URLs are derived from.
    pub const fn upstream_base(&self) -> &Url {
        &self.upstream_base
    }
}
