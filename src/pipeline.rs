use crate::config::Config;
use crate::delivery::{DeliveryOutcome, TenderSink, WebhookClient};
use crate::download::{DocumentStore, HttpDocumentSource};
use crate::extractor::Extractor;
use crate::feed::{HttpTenderFeed, TenderFeed};
use crate::models::TenderRecord;
use crate::processor::TenderProcessor;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Counts of one daily run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub tenders: usize,
    pub delivered: usize,
    /// Webhook answered with a non-200 status
    pub rejected: usize,
    /// Webhook could not be reached
    pub failed: usize,
}

/// Feed → enrich → deliver, one tender at a time
pub struct Pipeline {
    feed: Arc<dyn TenderFeed>,
    processor: TenderProcessor,
    sink: Arc<dyn TenderSink>,
    delay: Duration,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(
        feed: Arc<dyn TenderFeed>,
        processor: TenderProcessor,
        sink: Arc<dyn TenderSink>,
        delay: Duration,
    ) -> Self {
        Self {
            feed,
            processor,
            sink,
            delay,
            show_progress: false,
        }
    }

    /// Wire the HTTP feed, document source and webhook from the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let retry = RetryPolicy::new(&config.retry);

        let feed = HttpTenderFeed::new(config.feed.clone(), retry.clone());
        let source = HttpDocumentSource::new(retry.clone());
        let store = config.download.resolved_dir().map(DocumentStore::new);
        let extractor = Extractor::new(&config.text, config.extraction.clone());
        let sink = WebhookClient::new(&config.delivery, retry).context("Failed to create webhook client")?;

        Ok(Self::new(
            Arc::new(feed),
            TenderProcessor::new(Arc::new(source), extractor, store),
            Arc::new(sink),
            Duration::from_millis(config.delivery.delay_ms),
        ))
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub async fn fetch(&self, date: NaiveDate) -> Result<Vec<TenderRecord>> {
        let records = self
            .feed
            .fetch(date)
            .await
            .with_context(|| format!("Failed to fetch tenders for {}", date))?;
        tracing::info!("Fetched {} tenders for {}", records.len(), date);
        Ok(records)
    }

    /// Fill in the document texts of every record, in feed order
    pub async fn enrich_all(&self, records: &mut [TenderRecord]) {
        let pb = self.progress_bar(records.len() as u64);

        for record in records.iter_mut() {
            pb.set_message(record.label().to_string());
            self.processor.enrich(record).await;
            tracing::info!("Processed tender {}", record.label());
            pb.inc(1);
        }

        pb.finish_and_clear();
    }

    /// Post every record to the sink, pausing between two calls
    pub async fn deliver_all(&self, records: &[TenderRecord]) -> RunSummary {
        let mut summary = RunSummary {
            tenders: records.len(),
            ..RunSummary::default()
        };

        for (i, record) in records.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match self.sink.deliver(record).await {
                Ok(DeliveryOutcome::Delivered) => {
                    tracing::info!("Delivered tender {}", record.label());
                    summary.delivered += 1;
                }
                Ok(DeliveryOutcome::Rejected { status, body }) => {
                    tracing::warn!("Webhook rejected tender {} ({}): {}", record.label(), status, body);
                    summary.rejected += 1;
                }
                Err(e) => {
                    tracing::error!("Could not deliver tender {}: {:#}", record.label(), e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    pub async fn run(&self, date: NaiveDate) -> Result<RunSummary> {
        let mut records = self.fetch(date).await?;
        self.enrich_all(&mut records).await;
        let summary = self.deliver_all(&records).await;

        tracing::info!(
            tenders = summary.tenders,
            delivered = summary.delivered,
            rejected = summary.rejected,
            failed = summary.failed,
            "Run complete for {}",
            date
        );
        Ok(summary)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} tenders ({msg})",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}
