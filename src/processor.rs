use crate::constants::{DOCUMENT_DELIMITER, SECTION_DELIMITER, SECTION_HEADING};
use crate::download::{DocumentSource, DocumentStore};
use crate::extractor::{Extraction, Extractor};
use crate::models::{DocumentCategory, TenderRecord};
use crate::utils;
use std::collections::HashMap;
use std::sync::Arc;

/// Additional document texts grouped by category, rendered into `additional_text_all`
#[derive(Debug, Default)]
pub struct AdditionalText {
    entries: HashMap<DocumentCategory, Vec<String>>,
}

impl AdditionalText {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a document's text under the category inferred from its name
    pub fn push(&mut self, name: &str, text: &str) {
        let (category, entry) = match DocumentCategory::from_name(name) {
            Some(category) => (category, format!("{}:\n{}", name, text)),
            None => (DocumentCategory::Doc, format!("[Other: {}]\n{}", name, text)),
        };
        self.entries.entry(category).or_default().push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    pub fn render(&self) -> String {
        DocumentCategory::ALL
            .iter()
            .filter_map(|category| {
                let entries = self.entries.get(category).filter(|e| !e.is_empty())?;
                Some(format!(
                    "{} {}:\n{}",
                    SECTION_HEADING,
                    category.label(),
                    entries.join(DOCUMENT_DELIMITER)
                ))
            })
            .collect::<Vec<_>>()
            .join(SECTION_DELIMITER)
    }
}

/// Fills `notice_text` and `additional_text_all` of a tender record
pub struct TenderProcessor {
    source: Arc<dyn DocumentSource>,
    extractor: Extractor,
    store: Option<DocumentStore>,
}

impl TenderProcessor {
    pub fn new(source: Arc<dyn DocumentSource>, extractor: Extractor, store: Option<DocumentStore>) -> Self {
        Self {
            source,
            extractor,
            store,
        }
    }

    /// Download and extract every document of the record, in order
    pub async fn enrich(&self, record: &mut TenderRecord) {
        record.notice_text = self.notice_text(&record.notice_document).await;
        record.additional_text_all = self.additional_text(&record.additional_documents).await;
    }

    async fn notice_text(&self, url: &str) -> String {
        if url.trim().is_empty() {
            return String::new();
        }

        match self.source.fetch(url).await {
            Ok(fetched) if fetched.is_ok() => {
                let name = utils::file_name_from_url(url);
                let extraction = self.extract(name, fetched.bytes).await;
                tracing::info!("Notice document processed: {}", url);
                extraction.into_text()
            }
            Ok(fetched) => {
                tracing::warn!("Failed to download notice {}: {}", url, fetched.status);
                format!("Failed to download: {}", fetched.status)
            }
            Err(e) => {
                tracing::warn!("Error downloading notice {}: {:#}", url, e);
                format!("Error: {:#}", e)
            }
        }
    }

    async fn additional_text(&self, urls: &[String]) -> String {
        let mut additional = AdditionalText::new();

        for url in urls {
            match self.source.fetch(url).await {
                Ok(fetched) if fetched.is_ok() => {
                    let name = utils::file_name_from_url(url).to_lowercase();
                    let extraction = self.extract(name.clone(), fetched.bytes).await;
                    additional.push(&name, &extraction.into_text());
                    tracing::info!("Additional document processed: {}", name);
                }
                Ok(fetched) => {
                    tracing::warn!("Failed to download {}: {}", url, fetched.status);
                }
                Err(e) => {
                    tracing::warn!("Error processing {}: {:#}", url, e);
                }
            }
        }

        additional.render()
    }

    async fn extract(&self, name: String, bytes: Vec<u8>) -> Extraction {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&name, &bytes).await {
                tracing::warn!("Could not keep a copy of {}: {:#}", name, e);
            }
        }

        let extraction = self.extractor.extract_async(name.clone(), bytes).await;
        if let Some(kind) = extraction.failure_kind() {
            tracing::warn!(kind, "No text extracted from {}", name);
        }
        extraction
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeSource;
    use super::*;
    use crate::extractor::fixtures::docx_bytes;

    fn processor(source: FakeSource) -> TenderProcessor {
        TenderProcessor::new(Arc::new(source), Extractor::default(), None)
    }

    fn record(notice: &str, additional: &[&str]) -> TenderRecord {
        TenderRecord {
            tender_notice_no: "AO-1".to_string(),
            notice_document: notice.to_string(),
            additional_documents: additional.iter().map(|s| s.to_string()).collect(),
            ..TenderRecord::default()
        }
    }

    #[test]
    fn test_additional_text_sections_in_order() {
        let mut additional = AdditionalText::new();
        additional.push("prices.csv", "item qty");
        additional.push("notice.pdf", "pdf text");
        additional.push("annex.zip", "zip text");
        additional.push("specs.docx", "docx text");

        assert_eq!(
            additional.render(),
            "Name of the documents PDF:\nnotice.pdf:\npdf text\n\n\
Name of the documents DOC:\n[Other: annex.zip]\nzip text\n---\nspecs.docx:\ndocx text\n\n\
Name of the documents CSV:\nprices.csv:\nitem qty"
        );
    }

    #[test]
    fn test_additional_text_empty() {
        let additional = AdditionalText::new();
        assert!(additional.is_empty());
        assert_eq!(additional.render(), "");
    }

    #[tokio::test]
    async fn test_notice_404_and_no_additional_documents() {
        let processor = processor(FakeSource::new().with("https://d.org/notice.pdf", 404, b""));
        let mut tender = record("https://d.org/notice.pdf", &[]);

        processor.enrich(&mut tender).await;
        assert_eq!(tender.notice_text, "Failed to download: 404");
        assert_eq!(tender.additional_text_all, "");
    }

    #[tokio::test]
    async fn test_notice_transport_error() {
        let processor = processor(FakeSource::new().failing("https://d.org/n.pdf", "connection reset"));
        let mut tender = record("https://d.org/n.pdf", &[]);

        processor.enrich(&mut tender).await;
        assert_eq!(tender.notice_text, "Error: connection reset");
    }

    #[tokio::test]
    async fn test_notice_extracted() {
        let docx = docx_bytes(&["Avis d'appel d'offres", "Date limite : 30/06"]);
        let processor = processor(FakeSource::new().with("https://d.org/Avis.DOCX", 200, &docx));
        let mut tender = record("https://d.org/Avis.DOCX", &[]);

        processor.enrich(&mut tender).await;
        assert_eq!(tender.notice_text, "Avis d'appel d'offres Date limite : 30/06");
    }

    #[tokio::test]
    async fn test_empty_notice_url_is_not_fetched() {
        let source = Arc::new(FakeSource::new());
        let processor = TenderProcessor::new(source.clone(), Extractor::default(), None);
        let mut tender = record("", &[]);

        processor.enrich(&mut tender).await;
        assert_eq!(tender.notice_text, "");
        assert!(source.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_two_additional_pdfs_share_one_section() {
        let processor = processor(
            FakeSource::new()
                .with("https://d.org/a/Lot1.pdf", 200, b"not a pdf")
                .with("https://d.org/a/lot2.pdf", 200, b"still not a pdf"),
        );
        let mut tender = record(
            "",
            &["https://d.org/a/Lot1.pdf", "https://d.org/a/lot2.pdf"],
        );

        processor.enrich(&mut tender).await;
        let text = &tender.additional_text_all;
        assert_eq!(text.matches("Name of the documents").count(), 1);
        assert!(text.starts_with("Name of the documents PDF:\nlot1.pdf:\n[Error extracting from lot1.pdf"));

        let entries: Vec<&str> = text.split(DOCUMENT_DELIMITER).collect();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].starts_with("lot2.pdf:\n"));
    }

    #[tokio::test]
    async fn test_failed_additional_documents_are_skipped() {
        let processor = processor(
            FakeSource::new()
                .with("https://d.org/prices.csv", 200, b"item,qty\nsand,3\n")
                .failing("https://d.org/broken.pdf", "timed out"),
        );
        let mut tender = record(
            "",
            &["https://d.org/missing.xlsx", "https://d.org/broken.pdf", "https://d.org/prices.csv"],
        );

        processor.enrich(&mut tender).await;
        assert_eq!(
            tender.additional_text_all,
            "Name of the documents CSV:\nprices.csv:\nitem qty sand 3"
        );
    }

    #[tokio::test]
    async fn test_documents_kept_in_store() {
        let dir = tempfile::tempdir().unwrap();
        let processor = TenderProcessor::new(
            Arc::new(FakeSource::new().with("https://d.org/x/Notice.csv", 200, b"a\n1\n")),
            Extractor::default(),
            Some(DocumentStore::new(dir.path())),
        );
        let mut tender = record("https://d.org/x/Notice.csv", &[]);

        processor.enrich(&mut tender).await;
        assert_eq!(tender.notice_text, "a 1");
        assert!(dir.path().join("Notice.csv").exists());
    }
}
