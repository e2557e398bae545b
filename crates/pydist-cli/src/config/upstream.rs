//! Upstream package index configuration.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default base URL that distribution downloads are joined onto.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://files.pythonhosted.org/packages";

/// Upstream package index configuration.
///
/// # Environment Variables
///
/// - `UPSTREAM_BASE_URL` - Base URL for distribution downloads
///   (default: https://files.pythonhosted.org/packages)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct UpstreamConfig {
    /// Base URL that download paths are appended to.
    ///
    /// Distribution requests resolve to `{base_url}/{first}/{second}/{rest}/{distname}`.
    #[arg(
        long = "upstream-base-url",
        env = "UPSTREAM_BASE_URL",
        default_value = DEFAULT_UPSTREAM_BASE_URL
    )]
    pub base_url: Url,
}

impl UpstreamConfig {
    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL uses a scheme other than `http`
    /// or `https`.
    pub fn validate(&self) -> AnyhowResult<()> {
        let scheme = self.base_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(anyhow!(
                "Upstream base URL scheme {scheme:?} is not supported. Use http or https."
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_http_base_urls() {
        let config = UpstreamConfig {
            base_url: Url::parse(DEFAULT_UPSTREAM_BASE_URL).unwrap(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_non_http_schemes() {
        let config = UpstreamConfig {
            base_url: Url::parse("ftp://files.pythonhosted.org/packages").unwrap(),
        };
        assert!(config.validate().is_err());
    }
}
