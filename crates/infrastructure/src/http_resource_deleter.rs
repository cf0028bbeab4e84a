use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tagsweep_application::ResourceDeleter;
use tagsweep_core::{AppError, AppResult};
use tagsweep_domain::ResourceNode;
use tracing::{info, warn};
use url::Url;

/// Resource deleter calling the resource manager REST endpoint.
///
/// Issues `DELETE {base_url}{resource_id}?api-version=...` with a bearer
/// token. Accepted (202) deletions are not polled to completion.
pub struct HttpResourceDeleter {
    http_client: reqwest::Client,
    base_url: Url,
    access_token: String,
    api_version: String,
    max_attempts: u8,
    retry_backoff_ms: u64,
}

impl HttpResourceDeleter {
    /// Creates a new HTTP resource deleter.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        access_token: impl Into<String>,
        api_version: impl Into<String>,
        max_attempts: u8,
        retry_backoff_ms: u64,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid resource manager url '{base_url}': {error}"))
        })?;

        Ok(Self {
            http_client,
            base_url,
            access_token: access_token.into(),
            api_version: api_version.into(),
            max_attempts: max_attempts.max(1),
            retry_backoff_ms: retry_backoff_ms.max(50),
        })
    }

    fn delete_url(&self, resource_id: &str) -> AppResult<Url> {
        if !resource_id.starts_with('/') {
            return Err(AppError::Validation(format!(
                "resource id '{resource_id}' must be an absolute resource path"
            )));
        }

        let mut url = self.base_url.join(resource_id).map_err(|error| {
            AppError::Validation(format!("invalid resource id '{resource_id}': {error}"))
        })?;
        url.query_pairs_mut()
            .append_pair("api-version", self.api_version.as_str());

        Ok(url)
    }
}

#[async_trait]
impl ResourceDeleter for HttpResourceDeleter {
    async fn delete_resource(&self, resource: &ResourceNode) -> AppResult<()> {
        let url = self.delete_url(resource.id())?;
        let mut attempt = 0_u8;
        let mut last_error: Option<String> = None;

        while attempt < self.max_attempts {
            attempt = attempt.saturating_add(1);
            let response = self
                .http_client
                .delete(url.clone())
                .bearer_auth(self.access_token.as_str())
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    info!(
                        resource_id = resource.id(),
                        "resource already absent at the provider"
                    );
                    return Ok(());
                }
                Ok(response)
                    if response.status().is_server_error()
                        || response.status() == StatusCode::TOO_MANY_REQUESTS =>
                {
                    last_error = Some(format!(
                        "transient HTTP status {} deleting '{}'",
                        response.status(),
                        resource.id()
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
                    return Err(AppError::Unavailable(format!(
                        "delete of '{}' failed with status {status}: {body}",
                        resource.id()
                    )));
                }
                Err(error) => {
                    last_error = Some(format!("delete transport error: {error}"));
                }
            }

            if attempt < self.max_attempts {
                warn!(
                    resource_id = resource.id(),
                    attempt,
                    error = last_error.as_deref().unwrap_or_default(),
                    "retrying resource delete"
                );
                let delay = self.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(AppError::Unavailable(last_error.unwrap_or_else(|| {
            "resource delete exhausted retries".to_owned()
        })))
    }
}
