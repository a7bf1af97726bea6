//! Upstream company-information provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub employees: Option<u32>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("company API quota exceeded")]
    QuotaExceeded,

    #[error("company '{0}' not found")]
    NotFound(String),

    #[error("company API error: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait CompanySource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<CompanyInfo, SourceError>;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Company lookup over HTTP: `GET {base_url}/companies?name=<name>`.
#[derive(Clone)]
pub struct HttpCompanySource {
    client: Client,
    base_url: String,
}

impl HttpCompanySource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Upstream(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompanySource for HttpCompanySource {
    async fn fetch(&self, name: &str) -> Result<CompanyInfo, SourceError> {
        let response = self
            .client
            .get(format!("{}/companies", self.base_url))
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| SourceError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Company API quota exceeded while looking up '{name}'");
                Err(SourceError::QuotaExceeded)
            }
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(name.to_string())),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(SourceError::Upstream(format!("status {status}: {body}")))
            }
            _ => {
                let info: CompanyInfo = response
                    .json()
                    .await
                    .map_err(|e| SourceError::Upstream(e.to_string()))?;
                debug!("Fetched company '{}' with {} news items", info.name, info.news.len());
                Ok(info)
            }
        }
    }
}
