//! HTTP collaborators: product page fetch and batch lookup.

use std::time::Duration;

use futures_util::StreamExt;
use indicatif::ProgressBar;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use batchscan_core::models::config::ApiConfig;
use batchscan_core::{lookup_path, BatchCode, LookupResponse};

/// Client for the inventory API and for fetching product pages.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from API configuration.
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a page and return its body as text.
    ///
    /// Anything other than `200 OK` is an error. The body is streamed so a
    /// progress bar can follow large pages.
    pub async fn fetch_page(&self, url: &Url, pb: &ProgressBar) -> anyhow::Result<String> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            anyhow::bail!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
        }

        if let Some(content_length) = response.content_length() {
            pb.set_length(content_length);
        }

        let mut stream = response.bytes_stream();
        let mut body = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            body.extend_from_slice(&chunk);
            pb.set_position(body.len() as u64);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Look up the product carrying a batch code.
    pub async fn lookup(&self, code: &BatchCode) -> anyhow::Result<LookupResponse> {
        let url = format!("{}{}", self.base_url, lookup_path(code));
        debug!("Looking up {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            anyhow::bail!("lookup failed: HTTP {}", status);
        }

        Ok(response.json().await?)
    }

    /// Look up a batch code, folding failures into a not-found response.
    pub async fn lookup_or_report(&self, code: &BatchCode) -> LookupResponse {
        match self.lookup(code).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Lookup for {} failed: {}", code, e);
                failed_lookup(code, &e)
            }
        }
    }
}

fn failed_lookup(code: &BatchCode, error: &anyhow::Error) -> LookupResponse {
    LookupResponse {
        found: false,
        batch_number: Some(code.to_string()),
        error: Some(error.to_string()),
        ..Default::default()
    }
}

/// Parse a page URL, requiring an http(s) scheme and a host.
pub fn parse_page_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("Invalid URL format: {} ({})", raw, e))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        anyhow::bail!("Invalid URL format: {}", raw);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_url() {
        assert!(parse_page_url("https://example.com/p/1").is_ok());
        assert!(parse_page_url("  http://nebl.cn/02130832411190283934 ").is_ok());

        assert!(parse_page_url("example.com").is_err());
        assert!(parse_page_url("ftp://example.com/file").is_err());
        assert!(parse_page_url("file:///etc/hosts").is_err());
        assert!(parse_page_url("").is_err());
    }

    #[test]
    fn test_failed_lookup_keeps_batch_number() {
        let code: BatchCode = "5ABC123DEF".parse().unwrap();
        let response = failed_lookup(&code, &anyhow::anyhow!("connection refused"));

        assert!(!response.found);
        assert_eq!(response.batch_number.as_deref(), Some("5ABC123DEF"));
        assert_eq!(response.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:5000");
    }
}
