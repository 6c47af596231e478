//! The SSM-backed parameter source.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;
use tracing::debug;

use paramwrap_core::{ParameterSource, SourceError};

// GetParameters accepts at most ten names per request.
const NAMES_PER_REQUEST: usize = 10;

/// `ParameterSource` backed by AWS SSM Parameter Store.
///
/// Values are always requested with decryption; SecureString parameters come
/// back in plain text. Throttling and transient faults are retried by the
/// SDK according to the configured retry budget.
#[derive(Debug, Clone)]
pub struct SsmSource {
    client: Client,
}

impl SsmSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a source from the default AWS config chain.
    ///
    /// `retries`, when non-zero, caps the SDK's attempts per request.
    pub async fn connect(retries: u32) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if retries > 0 {
            loader = loader.retry_config(RetryConfig::standard().with_max_attempts(retries));
        }

        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ParameterSource for SsmSource {
    async fn fetch_by_names(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SourceError> {
        let mut params = HashMap::with_capacity(names.len());
        if names.is_empty() {
            return Ok(params);
        }

        let mut unique = names.to_vec();
        unique.sort();
        unique.dedup();

        for chunk in unique.chunks(NAMES_PER_REQUEST) {
            let output = self
                .client
                .get_parameters()
                .set_names(Some(chunk.to_vec()))
                .with_decryption(true)
                .send()
                .await
                .map_err(|err| {
                    SourceError::new(format!(
                        "GetParameters failed: {}",
                        DisplayErrorContext(&err)
                    ))
                })?;

            for param in output.parameters() {
                if let (Some(name), Some(value)) = (param.name(), param.value()) {
                    params.insert(name.to_string(), value.to_string());
                }
            }
        }

        debug!(requested = unique.len(), found = params.len(), "fetched parameters by names");

        Ok(params)
    }

    async fn fetch_by_path(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<HashMap<String, String>, SourceError> {
        let mut params = HashMap::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get_parameters_by_path()
                .path(path)
                .recursive(recursive)
                .with_decryption(true);

            if let Some(token) = &next_token {
                request = request.next_token(token);
            }

            let output = request.send().await.map_err(|err| {
                SourceError::new(format!(
                    "GetParametersByPath failed for {path}: {}",
                    DisplayErrorContext(&err)
                ))
            })?;

            for param in output.parameters() {
                if let (Some(name), Some(value)) = (param.name(), param.value()) {
                    params.insert(name.to_string(), value.to_string());
                }
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(%path, recursive, found = params.len(), "fetched parameters by path");

        Ok(params)
    }
}
