// ABOUTME: Page fetching collaborator used by the site adapters.
// ABOUTME: HttpFetcher enforces a domain allow-list, a size cap and charset decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use url::Url;

use crate::error::ScrapeError;

/// Maximum accepted body size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// User agent sent to the shops unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Upper bound on an outbound page fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest slice of an error body kept for diagnostics.
const ERROR_BODY_LIMIT: usize = 512;

/// One page request issued by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub user_agent: String,
    /// Hosts the request (and any redirect) may land on. Empty allows every host.
    pub allowed_domains: Vec<String>,
}

/// Returns the raw markup for a page, or a transport error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> Result<String, ScrapeError>;
}

/// reqwest-backed [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherBuilder {
    timeout: Duration,
    client: Option<reqwest::Client>,
}

impl HttpFetcherBuilder {
    /// Create a builder with the default timeout.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured HTTP client; the timeout setting is then ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpFetcher, ScrapeError> {
        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| ScrapeError::fetch("", "Build", Some(e.into())))?,
        };
        Ok(HttpFetcher { client })
    }
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a new builder.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<String, ScrapeError> {
        let url = request.url.as_str();
        let parsed = Url::parse(url).map_err(|e| {
            ScrapeError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ScrapeError::invalid_url(
                url,
                "Fetch",
                Some(anyhow::anyhow!("scheme must be http or https")),
            ));
        }
        check_allowed(&parsed, &request.allowed_domains, url)?;

        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, &request.user_agent)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        // Redirects must stay on the allow-list too.
        check_allowed(response.url(), &request.allowed_domains, url)?;

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(ScrapeError::fetch(
                    url,
                    "Fetch",
                    Some(anyhow::anyhow!("content too large")),
                ));
            }
        }

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response.bytes().await.map_err(|e| transport_error(url, e))?;
        if body.len() > MAX_CONTENT_LENGTH {
            return Err(ScrapeError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }

        let text = decode_body(&body, content_type.as_deref());
        if status != 200 {
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(ScrapeError::status(url, "Fetch", status, &snippet));
        }
        Ok(text)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::timeout(url, "Fetch", Some(err.into()))
    } else {
        ScrapeError::fetch(url, "Fetch", Some(err.into()))
    }
}

fn check_allowed(target: &Url, allowed: &[String], url: &str) -> Result<(), ScrapeError> {
    if allowed.is_empty() {
        return Ok(());
    }
    let host = target.host_str().unwrap_or_default();
    if allowed.iter().any(|d| d.eq_ignore_ascii_case(host)) {
        Ok(())
    } else {
        Err(ScrapeError::blocked(
            url,
            "Fetch",
            Some(anyhow::anyhow!("host {:?} is not in the allow-list", host)),
        ))
    }
}

/// Decode body bytes using the content-type charset, or detection when absent.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|cs| cs.trim_matches('"').trim_matches('\'').to_string())
    })
}
