use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};

use super::extract::html_to_text;
use crate::core::config::ScraperSettings;
use crate::core::errors::ApiError;

/// Fetches pages and reduces them to "Source: ..." prefixed text blocks.
#[derive(Clone)]
pub struct WebScraper {
    client: Client,
    max_concurrency: usize,
    max_body_bytes: usize,
}

impl WebScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_concurrency: settings.max_concurrency.max(1),
            max_body_bytes: settings.max_body_bytes,
        })
    }

    /// Scrapes every non-empty URL, keeping input order.
    ///
    /// A failing URL contributes an error block instead of failing the batch.
    pub async fn scrape_urls(&self, urls: &[String]) -> Vec<String> {
        let targets: Vec<String> = urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(normalize_url)
            .collect();

        tracing::info!("Scraping {} url(s)", targets.len());

        stream::iter(targets)
            .map(|url| async move { self.scrape_one(&url).await })
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn scrape_one(&self, url: &str) -> String {
        match self.fetch(url).await {
            Ok(FetchOutcome::Page(html)) => {
                let text = html_to_text(&html);
                tracing::debug!("Scraped {} ({} chars)", url, text.chars().count());
                format!("Source: {}\n{}", url, text)
            }
            Ok(FetchOutcome::Status(status)) => {
                tracing::warn!("Scrape of {} returned {}", url, status);
                format!("Source: {}\nFailed to scrape: {}", url, status.as_u16())
            }
            Err(err) => {
                tracing::warn!("Scrape of {} failed: {}", url, err);
                format!("Source: {}\nError: {}", url, err)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<FetchOutcome, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Ok(FetchOutcome::Status(response.status()));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_body_bytes as u64 {
                tracing::warn!(
                    "Body of {} is {} bytes, reading the first {}",
                    url,
                    declared,
                    self.max_body_bytes
                );
            }
        }

        // Stop reading at the cap instead of buffering the whole page.
        let mut chunks = response.bytes_stream();
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = chunks.next().await {
            let data = chunk?;
            let room = self.max_body_bytes - body.len();
            if data.len() >= room {
                body.extend_from_slice(&data[..room]);
                if data.len() > room || chunks.next().await.is_some() {
                    tracing::debug!("Truncated {} at {} bytes", url, self.max_body_bytes);
                }
                break;
            }
            body.extend_from_slice(&data);
        }

        Ok(FetchOutcome::Page(decode_body(body)))
    }
}

/// UTF-8 decode, dropping a character split by the byte cap.
fn decode_body(body: Vec<u8>) -> String {
    match String::from_utf8(body) {
        Ok(text) => text,
        Err(err) => {
            let utf8 = err.utf8_error();
            let mut bytes = err.into_bytes();
            if utf8.error_len().is_none() {
                bytes.truncate(utf8.valid_up_to());
            }
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}

enum FetchOutcome {
    Page(String),
    Status(StatusCode),
}

/// Bare hosts get an `https://` scheme; anything starting with `http` is kept.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
