use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use strata_core::config::RepositoryConfig;
use strata_core::constants::{JSONLD_MEDIA_TYPE, METADATA_SUFFIX};
use strata_core::errors::{CrawlError, RepositoryError};
use strata_core::models::{FetchResponse, TransformTarget};
use strata_core::traits::Repository;
use strata_core::StrataResult;

use super::http_client::{repository_error, HttpClientConfig};
use super::link_header::targets_with_rel;

/// Repository client over the LDP REST API, authenticated for direct reads.
pub struct HttpRepository {
    base_url: String,
    client: Client,
    settings: HttpClientConfig,
}

impl HttpRepository {
    pub fn new(config: &RepositoryConfig) -> StrataResult<Self> {
        let settings = HttpClientConfig::for_repository(config);
        let client = settings.build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            settings,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn transform_url(&self, path: &str, endpoint: &str) -> String {
        if endpoint.contains("://") {
            return format!("{}{}", endpoint.trim_end_matches('/'), path);
        }
        format!(
            "{}/{}",
            self.url_for(path).trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn get_json_ld(&self, url: &str) -> StrataResult<reqwest::Response> {
        let request = self.client.get(url).header(ACCEPT, JSONLD_MEDIA_TYPE);
        self.settings
            .authorize(request)
            .send()
            .await
            .map_err(|e| repository_error(url, e))
    }
}

fn is_absent(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::GONE
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"))
}

#[async_trait]
impl Repository for HttpRepository {
    async fn head(&self, path: &str) -> StrataResult<Option<Vec<String>>> {
        let url = self.url_for(path);
        let response = self
            .settings
            .authorize(self.client.head(&url))
            .send()
            .await
            .map_err(|e| repository_error(&url, e))?;

        let status = response.status();
        if is_absent(status) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RepositoryError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            }
            .into());
        }
        let links = response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok());
        Ok(Some(targets_with_rel(links, "type")))
    }

    async fn fetch(&self, path: &str, target: &TransformTarget) -> StrataResult<FetchResponse> {
        let url = match target.endpoint.as_deref() {
            Some(endpoint) => self.transform_url(path, endpoint),
            None => self.url_for(path),
        };
        let response = self.get_json_ld(&url).await?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| repository_error(&url, e))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        tracing::debug!(url = %url, status, "repository fetch");
        Ok(FetchResponse { status, body, url })
    }

    async fn graph(&self, path: &str) -> StrataResult<Option<Value>> {
        let mut url = self.url_for(path);
        let mut response = self.get_json_ld(&url).await?;

        // Binaries answer with their content; their graph lives on the companion.
        if response.status().is_success() && !is_json(&response) && !path.ends_with(METADATA_SUFFIX)
        {
            url = format!("{}{METADATA_SUFFIX}", url.trim_end_matches('/'));
            response = self.get_json_ld(&url).await?;
        }

        let status = response.status();
        if is_absent(status) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RepositoryError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            }
            .into());
        }
        let text = response
            .text()
            .await
            .map_err(|e| repository_error(&url, e))?;
        let graph = serde_json::from_str(&text).map_err(|e| CrawlError::PartialGraph {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> HttpRepository {
        HttpRepository::new(&RepositoryConfig {
            base_url: "http://localhost:8080/rest/".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn urls_join_base_and_path() {
        let repo = repository();
        assert_eq!(repo.url_for("/a/b"), "http://localhost:8080/rest/a/b");
        assert_eq!(repo.url_for("/"), "http://localhost:8080/rest/");
    }

    #[test]
    fn relative_transform_endpoints_hang_off_the_resource() {
        let repo = repository();
        assert_eq!(
            repo.transform_url("/a/b", "fcr:transform/solr"),
            "http://localhost:8080/rest/a/b/fcr:transform/solr"
        );
        assert_eq!(
            repo.transform_url("/a/b", "http://transform:9000/render/"),
            "http://transform:9000/render/a/b"
        );
    }
}
