//! Shared reqwest client setup and error mapping.

use std::time::Duration;

use strata_core::config::{IndexConfig, RepositoryConfig};
use strata_core::errors::{IndexError, RepositoryError};
use strata_core::{StrataError, StrataResult};

/// Connection settings for one outbound HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub basic_auth: Option<(String, String)>,
}

impl HttpClientConfig {
    pub fn for_repository(config: &RepositoryConfig) -> Self {
        let basic_auth = match (&config.direct_user, &config.direct_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            (Some(user), None) => Some((user.clone(), String::new())),
            _ => None,
        };
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            basic_auth,
        }
    }

    pub fn for_index(config: &IndexConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            basic_auth: None,
        }
    }

    /// Build the client. Every request is bounded by the configured timeout.
    pub fn build(&self) -> StrataResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                RepositoryError::NetworkError {
                    url: String::new(),
                    reason: format!("client setup failed: {e}"),
                }
                .into()
            })
    }

    /// Attach credentials, if any, to a request.
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.basic_auth {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }
}

/// Map a transport failure against the repository.
pub fn repository_error(url: &str, err: reqwest::Error) -> StrataError {
    if err.is_timeout() {
        RepositoryError::Timeout { url: url.to_string() }.into()
    } else if err.is_decode() {
        RepositoryError::MalformedPayload {
            url: url.to_string(),
            reason: err.to_string(),
        }
        .into()
    } else {
        RepositoryError::NetworkError {
            url: url.to_string(),
            reason: err.to_string(),
        }
        .into()
    }
}

/// Map a transport failure against the search index.
pub fn index_error(url: &str, err: reqwest::Error) -> StrataError {
    if err.is_timeout() {
        IndexError::Timeout { url: url.to_string() }.into()
    } else {
        IndexError::RequestFailed {
            reason: format!("{url}: {err}"),
        }
        .into()
    }
}
