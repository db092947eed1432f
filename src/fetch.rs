use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::warn;
use url::Url;

use crate::config::Settings;

const BASE_BACKOFF_MS: u64 = 1000;

/// Where the pipeline gets its HTML from.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> Result<String>;
}

pub struct HttpSource {
    client: Client,
    max_retries: u32,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            max_retries: settings.max_retries,
        })
    }

    fn fetch_once(&self, url: &Url) -> Result<Result<String, StatusCode>> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .with_context(|| format!("GET {}", url))?;
        let status = response.status();
        if !status.is_success() {
            return Ok(Err(status));
        }
        let body = response
            .text()
            .with_context(|| format!("Failed to read body of {}", url))?;
        Ok(Ok(body))
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &Url) -> Result<String> {
        for attempt in 0..=self.max_retries {
            match self.fetch_once(url)? {
                Ok(body) => return Ok(body),
                Err(status) if should_retry(status) && attempt < self.max_retries => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "{} on {} (attempt {}/{}), backing off {:.1}s",
                        status,
                        url,
                        attempt + 1,
                        self.max_retries,
                        backoff.as_secs_f64()
                    );
                    std::thread::sleep(backoff);
                }
                Err(status) => anyhow::bail!("GET {} returned {}", url, status),
            }
        }
        anyhow::bail!("GET {} failed after {} retries", url, self.max_retries)
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
