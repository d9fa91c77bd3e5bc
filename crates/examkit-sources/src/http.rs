//! HTTP question source.
//!
//! Fetches a whole bank with a single GET. The body format follows the URL
//! path extension and defaults to JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use examkit_core::bank::{parse_bank_str, BankFormat};
use examkit_core::error::SourceError;
use examkit_core::model::QuestionBank;
use examkit_core::traits::QuestionSource;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote question bank served over HTTP.
pub struct HttpSource {
    url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout_secs: Option<u64>) -> anyhow::Result<Self> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            url: url.to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn format_and_id(&self) -> (BankFormat, String) {
        let parsed = reqwest::Url::parse(&self.url).ok();
        let path = parsed.as_ref().map(|u| Path::new(u.path()));

        let format = path
            .and_then(BankFormat::from_path)
            .unwrap_or(BankFormat::Json);
        let id = path
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("remote")
            .to_string();

        (format, id)
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> anyhow::Result<QuestionBank> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                SourceError::Network(format!("{} not reachable: {e}", self.url))
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(SourceError::NotFound(self.url.clone()).into());
        }
        if status >= 400 {
            return Err(SourceError::Http {
                status,
                url: self.url.clone(),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| SourceError::Read {
            location: self.url.clone(),
            message: e.to_string(),
        })?;

        let (format, id) = self.format_and_id();
        tracing::debug!(bytes = body.len(), ?format, "bank body received");
        parse_bank_str(&body, format, &id)
    }
}
