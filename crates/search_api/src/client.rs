use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use search_ui::{Section, SuggestionKind, SuggestionRequest};
use serde_json::Value;

use crate::config::SearchApiConfig;
use crate::error::SearchApiError;
use crate::transform;

/// Optional cancellation signal shared with an in-flight request.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

pub const FILTER_SEARCH_PATH: &str = "/v2/accounts/me/answers/filtersearch";
pub const VERTICAL_AUTOCOMPLETE_PATH: &str = "/v2/accounts/me/entities/autocomplete";
pub const UNIVERSAL_AUTOCOMPLETE_PATH: &str = "/v2/accounts/me/answers/autocomplete";

pub const FILTER_SEARCH: &str = "filter search";
pub const VERTICAL_AUTOCOMPLETE: &str = "vertical autocomplete";
pub const UNIVERSAL_AUTOCOMPLETE: &str = "universal autocomplete";

#[derive(Debug, Clone)]
pub struct AutocompleteApi {
    http: Client,
    config: SearchApiConfig,
}

impl AutocompleteApi {
    pub fn new(config: SearchApiConfig) -> Result<Self, SearchApiError> {
        if config.api_key.trim().is_empty() {
            return Err(SearchApiError::MissingApiKey);
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SearchApiError::Client)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SearchApiConfig {
        &self.config
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim().trim_end_matches('/'))
    }

    pub fn filter_request(
        &self,
        input: &str,
        vertical_key: Option<&str>,
        bar_key: Option<&str>,
    ) -> RequestBuilder {
        self.get(
            FILTER_SEARCH_PATH,
            input,
            &[
                ("answersKey", Some(self.config.experience_key.as_str())),
                ("experienceKey", vertical_key),
                ("inputKey", bar_key),
            ],
        )
    }

    pub fn vertical_request(
        &self,
        input: &str,
        vertical_key: Option<&str>,
        bar_key: Option<&str>,
    ) -> RequestBuilder {
        self.get(
            VERTICAL_AUTOCOMPLETE_PATH,
            input,
            &[("experienceKey", vertical_key), ("barKey", bar_key)],
        )
    }

    pub fn universal_request(&self, query: &str) -> RequestBuilder {
        self.get(
            UNIVERSAL_AUTOCOMPLETE_PATH,
            query,
            &[("answersKey", Some(self.config.experience_key.as_str()))],
        )
    }

    pub async fn query_filter(
        &self,
        input: &str,
        vertical_key: Option<&str>,
        bar_key: Option<&str>,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<Section>, SearchApiError> {
        let request = self.filter_request(input, vertical_key, bar_key);
        let response = self.fetch(FILTER_SEARCH, request, cancellation).await?;
        transform::filter(&response, bar_key)
            .map_err(|error| SearchApiError::endpoint(FILTER_SEARCH, error.to_string()))
    }

    pub async fn query_vertical(
        &self,
        input: &str,
        vertical_key: Option<&str>,
        bar_key: Option<&str>,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<Section>, SearchApiError> {
        let request = self.vertical_request(input, vertical_key, bar_key);
        let response = self.fetch(VERTICAL_AUTOCOMPLETE, request, cancellation).await?;
        transform::vertical(&response, bar_key)
            .map_err(|error| SearchApiError::endpoint(VERTICAL_AUTOCOMPLETE, error.to_string()))
    }

    pub async fn query_universal(
        &self,
        query: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<Section>, SearchApiError> {
        let request = self.universal_request(query);
        let response = self.fetch(UNIVERSAL_AUTOCOMPLETE, request, cancellation).await?;
        transform::universal(&response)
            .map_err(|error| SearchApiError::endpoint(UNIVERSAL_AUTOCOMPLETE, error.to_string()))
    }

    /// Run the endpoint matching the request's kind.
    pub async fn query(
        &self,
        request: &SuggestionRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<Section>, SearchApiError> {
        let experience_key = request.experience_key.as_deref();
        let bar_key = request.bar_key.as_deref();
        match request.kind {
            SuggestionKind::Filter => {
                self.query_filter(&request.input, experience_key, bar_key, cancellation)
                    .await
            }
            SuggestionKind::Vertical => {
                self.query_vertical(&request.input, experience_key, bar_key, cancellation)
                    .await
            }
            SuggestionKind::Universal => self.query_universal(&request.input, cancellation).await,
        }
    }

    fn get(&self, path: &str, input: &str, extra: &[(&str, Option<&str>)]) -> RequestBuilder {
        let mut params: Vec<(&str, &str)> = vec![
            ("api_key", self.config.api_key.as_str()),
            ("v", self.config.version.as_str()),
            ("input", input),
        ];
        params.extend(
            extra
                .iter()
                .filter_map(|(name, value)| value.map(|value| (*name, value)))
                .filter(|(_, value)| !value.trim().is_empty()),
        );
        self.http.get(self.endpoint_url(path)).query(&params)
    }

    /// Send `request` and return the inner `response` object of the reply.
    async fn fetch(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Value, SearchApiError> {
        if is_cancelled(cancellation) {
            return Err(SearchApiError::Cancelled);
        }

        let response = await_or_cancel(request.send(), cancellation)
            .await?
            .map_err(|error| SearchApiError::transport(operation, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = await_or_cancel(response.text(), cancellation)
                .await?
                .unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status} {}", body.trim())
            };
            tracing::debug!(operation, %status, "endpoint returned an error status");
            return Err(SearchApiError::endpoint(operation, message));
        }

        let mut body: Value = await_or_cancel(response.json(), cancellation)
            .await?
            .map_err(|error| SearchApiError::transport(operation, error))?;
        Ok(body
            .get_mut("response")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }
}

pub fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, SearchApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(SearchApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(SearchApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
