use crate::config::DeliveryConfig;
use crate::models::TenderRecord;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// What the receiving endpoint made of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Rejected { status: u16, body: String },
}

/// Downstream consumer of enriched tender records
#[async_trait]
pub trait TenderSink: Send + Sync {
    /// Send one record. Transport failures are errors; any HTTP answer is an outcome.
    async fn deliver(&self, record: &TenderRecord) -> Result<DeliveryOutcome>;
}

/// Automation webhook receiving one JSON object per call
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl WebhookClient {
    pub fn new(config: &DeliveryConfig, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build webhook HTTP client")?;

        Ok(Self {
            client,
            url: config.webhook_url.clone(),
            retry,
        })
    }
}

#[async_trait]
impl TenderSink for WebhookClient {
    async fn deliver(&self, record: &TenderRecord) -> Result<DeliveryOutcome> {
        let client = &self.client;
        let url = self.url.as_str();

        self.retry
            .run("webhook delivery", move || async move {
                let response = client
                    .post(url)
                    .json(record)
                    .send()
                    .await
                    .context("Failed to reach webhook")?;

                let status = response.status().as_u16();
                if status == 200 {
                    return Ok(DeliveryOutcome::Delivered);
                }

                let body = response.text().await.unwrap_or_default();
                Ok::<_, anyhow::Error>(DeliveryOutcome::Rejected { status, body })
            })
            .await
    }
}
