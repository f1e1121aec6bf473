use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::{ConfigError, OAuthConfig};

/// Result of asking the OAuth service about a token.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid,
    /// The service answered with a non-2xx status.
    Rejected(StatusCode),
    /// The service could not be reached.
    Unavailable(String),
}

/// Checks an outbound `Authorization` value against an authority.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, authorization: HeaderValue) -> ValidationOutcome;
}

#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// POSTs to the OAuth service's `/validate` endpoint. One shared client, so
/// connections are pooled across requests. No retries.
pub struct HttpTokenValidator {
    client: reqwest::Client,
    url: Url,
}

impl HttpTokenValidator {
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self, ValidatorError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url,
        })
    }

    pub fn from_config(config: &OAuthConfig) -> Result<Self, ValidatorError> {
        Self::new(
            config.validate_url()?,
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, authorization: HeaderValue) -> ValidationOutcome {
        let result = self
            .client
            .post(self.url.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => ValidationOutcome::Valid,
            Ok(response) => ValidationOutcome::Rejected(response.status()),
            Err(e) => ValidationOutcome::Unavailable(e.to_string()),
        }
    }
}
