pub mod config;
pub mod constants;
pub mod delivery;
pub mod download;
pub mod extractor;
pub mod feed;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod processor;
pub mod retry;
pub mod utils;

pub use delivery::{DeliveryOutcome, TenderSink, WebhookClient};
pub use download::{DocumentSource, DocumentStore, HttpDocumentSource};
pub use extractor::{DocumentDecoder, Extraction, ExtractionError, Extractor};
pub use feed::{HttpTenderFeed, TenderFeed};
pub use models::{DocumentCategory, TenderRecord};
pub use normalizer::TextNormalizer;
pub use pipeline::{Pipeline, RunSummary};
pub use processor::TenderProcessor;
