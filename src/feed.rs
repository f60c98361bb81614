use crate::config::FeedConfig;
use crate::models::TenderRecord;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::Value;

/// Source of the daily tender listing
#[async_trait]
pub trait TenderFeed: Send + Sync {
    /// Fetch the tenders published for `date`
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<TenderRecord>>;
}

/// Tender feed served as JSON over HTTP (`GET <url>?date=YYYY-MM-DD`)
pub struct HttpTenderFeed {
    client: reqwest::Client,
    config: FeedConfig,
    retry: RetryPolicy,
}

impl HttpTenderFeed {
    pub fn new(config: FeedConfig, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            retry,
        }
    }

    fn query(&self, date: NaiveDate) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(username) = &self.config.username {
            query.push(("username", username.clone()));
        }
        if let Some(key) = &self.config.key {
            query.push(("key", key.clone()));
        }
        query.push(("date", date.format("%Y-%m-%d").to_string()));
        query
    }
}

#[async_trait]
impl TenderFeed for HttpTenderFeed {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<TenderRecord>> {
        let client = &self.client;
        let url = self.config.url.as_str();
        let query = self.query(date);
        let query = &query;

        // Only the transport is retried; an error status or a bad body is final
        let response = self
            .retry
            .run("tender feed", move || async move {
                client
                    .get(url)
                    .query(query)
                    .send()
                    .await
                    .context("Failed to connect to tender feed")
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Tender feed returned error {}: {}", status, error_text);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse tender feed response")?;

        parse_feed(&body)
    }
}

/// Turn a feed body into records; a missing or null `data` means no tenders
pub fn parse_feed(body: &Value) -> Result<Vec<TenderRecord>> {
    let object = body
        .as_object()
        .context("Tender feed response is not a JSON object")?;

    match object.get("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries.iter().map(TenderRecord::from_feed_entry).collect()),
        Some(other) => anyhow::bail!("Tender feed `data` is not an array: {}", other),
    }
}

/// The feed is pulled for the previous day
pub fn default_target_date() -> NaiveDate {
    let today = Local::now().date_naive();
    today.pred_opt().unwrap_or(today)
}
