// ABOUTME: HTTP client for the generateContent endpoint and its fluent builder.
// ABOUTME: insights() builds the prompt, posts it once and parses the structured reply.

use std::fmt;
use std::time::Duration;

use smartyshop_scrapers::Product;
use tracing::{debug, info};
use url::Url;

use crate::error::AssistantError;
use crate::prompt::build_prompt;
use crate::response::{parse_reply, reply_text, AssistantResponse};
use crate::wire::{GenerateRequest, GenerateResponse};

/// Model used unless overridden.
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Origin of the hosted generative API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Upper bound on one assistant call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the generative assistant.
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: Url,
}

/// Builder for [`AssistantClient`].
#[derive(Clone)]
pub struct AssistantClientBuilder {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    timeout: Duration,
    http: Option<reqwest::Client>,
}

impl AssistantClientBuilder {
    /// Create a builder with the default model, endpoint and timeout.
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: None,
        }
    }

    /// Set the API key. Required.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API origin, e.g. a local mock server.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured HTTP client; the timeout setting is then ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Build the client. Fails without a non-empty API key or with a malformed endpoint.
    pub fn build(self) -> Result<AssistantClient, AssistantError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AssistantError::MissingApiKey)?;

        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        let url = Url::parse(&raw).map_err(|source| AssistantError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(AssistantError::Request)?,
        };

        Ok(AssistantClient {
            http,
            api_key,
            model: self.model,
            url,
        })
    }
}

impl Default for AssistantClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssistantClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for AssistantClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl AssistantClient {
    /// Create a new builder.
    pub fn builder() -> AssistantClientBuilder {
        AssistantClientBuilder::new()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Asks `question` about `products` and returns the structured answer.
    ///
    /// One request, no retries. The API key travels as the `key` query
    /// parameter and never appears in logs or errors.
    pub async fn insights(
        &self,
        products: &[Product],
        question: &str,
    ) -> Result<AssistantResponse, AssistantError> {
        let request = GenerateRequest::from_prompt(build_prompt(products, question));
        debug!(model = %self.model, products = products.len(), "assistant request");

        let response = self
            .http
            .post(self.url.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::Request(e.without_url()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Request(e.without_url()))?;
        if status != 200 {
            return Err(AssistantError::Status { status, body });
        }

        let envelope: GenerateResponse = serde_json::from_str(&body)
            .map_err(|source| AssistantError::Decode { body: body.clone(), source })?;
        let reply = parse_reply(reply_text(&envelope)?)?;
        info!(
            model = %self.model,
            picked = reply.products.len(),
            "assistant answered"
        );
        Ok(reply)
    }
}
