use crate::constants::{
    CSV_EXTENSIONS, DOC_CATEGORY_EXTENSIONS, IMAGE_EXTENSIONS, PDF_EXTENSIONS,
    SPREADSHEET_EXTENSIONS,
};
use crate::utils;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One tender from the feed, enriched with the text of its documents
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TenderRecord {
    pub tot_id: String,
    pub country_iso: String,
    pub tender_notice_no: String,
    pub title: String,
    pub description: String,
    pub cpv: String,
    pub posting_date: String,
    pub closing_date: String,
    pub document_type: String,
    pub bidding_type: String,
    pub purchaser_name: String,
    pub purchaser_country: String,
    pub purchaser_address: String,
    pub purchaser_email: String,
    pub purchaser_website: String,
    pub tender_value: String,
    pub currency: String,
    pub financier: String,
    /// URL of the notice document
    pub notice_document: String,
    /// URLs of the additional documents, sent as one comma-separated string
    #[serde(serialize_with = "serialize_joined")]
    pub additional_documents: Vec<String>,
    /// Extracted text of the notice document (or a download failure message)
    pub notice_text: String,
    /// Extracted text of the additional documents, grouped by category
    pub additional_text_all: String,
}

fn serialize_joined<S>(urls: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&urls.join(", "))
}

impl TenderRecord {
    /// Build a record from one element of the feed's `data` array.
    ///
    /// Missing keys and nulls become empty strings; numbers and booleans keep their JSON text.
    pub fn from_feed_entry(entry: &Value) -> Self {
        let field = |key: &str| scalar_text(entry.get(key));

        Self {
            tot_id: field("tot_id"),
            country_iso: field("country_iso"),
            tender_notice_no: field("tender_notice_no"),
            title: field("title"),
            description: field("description"),
            cpv: field("cpv"),
            posting_date: field("posting_date"),
            closing_date: field("closing_date"),
            document_type: field("document_type"),
            bidding_type: field("bidding_type"),
            purchaser_name: field("purchaser_name"),
            purchaser_country: field("purchaser_country"),
            purchaser_address: field("purchaser_address"),
            purchaser_email: field("purchaser_email"),
            purchaser_website: field("purchaser_website"),
            tender_value: field("tender_value"),
            currency: field("currency"),
            financier: field("financier"),
            notice_document: field("notice_document"),
            additional_documents: url_list(entry.get("additional_documents")),
            notice_text: String::new(),
            additional_text_all: String::new(),
        }
    }

    /// Label used in logs: the notice number, or the feed id when it is blank
    pub fn label(&self) -> &str {
        if self.tender_notice_no.trim().is_empty() {
            &self.tot_id
        } else {
            &self.tender_notice_no
        }
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn url_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Category an additional document is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentCategory {
    Pdf,
    Doc,
    Excel,
    Csv,
    Image,
}

impl DocumentCategory {
    /// Output order of the category sections
    pub const ALL: [DocumentCategory; 5] = [
        DocumentCategory::Pdf,
        DocumentCategory::Doc,
        DocumentCategory::Excel,
        DocumentCategory::Csv,
        DocumentCategory::Image,
    ];

    /// Category inferred from the file name; `None` for anything else (filed as "Other" under DOC)
    pub fn from_name(name: &str) -> Option<Self> {
        if utils::has_suffix(name, PDF_EXTENSIONS) {
            Some(Self::Pdf)
        } else if utils::has_suffix(name, DOC_CATEGORY_EXTENSIONS) {
            Some(Self::Doc)
        } else if utils::has_suffix(name, SPREADSHEET_EXTENSIONS) {
            Some(Self::Excel)
        } else if utils::has_suffix(name, CSV_EXTENSIONS) {
            Some(Self::Csv)
        } else if utils::has_suffix(name, IMAGE_EXTENSIONS) {
            Some(Self::Image)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Doc => "DOC",
            Self::Excel => "EXCEL",
            Self::Csv => "CSV",
            Self::Image => "IMAGE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_feed_entry() {
        let entry = json!({
            "tot_id": "T-100",
            "tender_notice_no": "AO-2024-17",
            "title": "Fourniture de ciment",
            "tender_value": 125000.5,
            "financier": null,
            "notice_document": "https://docs.example.org/n/17.pdf",
            "additional_documents": ["https://docs.example.org/a/1.pdf", "", "https://docs.example.org/a/2.zip"]
        });

        let record = TenderRecord::from_feed_entry(&entry);
        assert_eq!(record.tot_id, "T-100");
        assert_eq!(record.tender_value, "125000.5");
        assert_eq!(record.financier, "");
        assert_eq!(record.currency, "");
        assert_eq!(record.additional_documents.len(), 2);
        assert_eq!(record.label(), "AO-2024-17");
    }

    #[test]
    fn test_record_missing_everything() {
        let record = TenderRecord::from_feed_entry(&json!({}));
        assert_eq!(record, TenderRecord::default());
        assert_eq!(record.label(), "");
    }

    #[test]
    fn test_additional_documents_as_string() {
        let entry = json!({ "additional_documents": "https://x.org/a.pdf, https://x.org/b.csv" });
        let record = TenderRecord::from_feed_entry(&entry);
        assert_eq!(
            record.additional_documents,
            vec!["https://x.org/a.pdf".to_string(), "https://x.org/b.csv".to_string()]
        );
    }

    #[test]
    fn test_record_serialization_is_flat() {
        let mut record = TenderRecord::from_feed_entry(&json!({
            "tot_id": "7",
            "additional_documents": ["https://x.org/a.pdf", "https://x.org/b.pdf"]
        }));
        record.notice_text = "notice".to_string();

        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 22);
        assert_eq!(object["additional_documents"], "https://x.org/a.pdf, https://x.org/b.pdf");
        assert_eq!(object["notice_text"], "notice");
        assert_eq!(object["additional_text_all"], "");
    }

    #[test]
    fn test_document_category_from_name() {
        assert_eq!(DocumentCategory::from_name("a.PDF"), Some(DocumentCategory::Pdf));
        assert_eq!(DocumentCategory::from_name("a.doc"), Some(DocumentCategory::Doc));
        assert_eq!(DocumentCategory::from_name("a.docx"), Some(DocumentCategory::Doc));
        assert_eq!(DocumentCategory::from_name("a.xlsx"), Some(DocumentCategory::Excel));
        assert_eq!(DocumentCategory::from_name("a.csv"), Some(DocumentCategory::Csv));
        assert_eq!(DocumentCategory::from_name("a.webp"), Some(DocumentCategory::Image));
        assert_eq!(DocumentCategory::from_name("a.zip"), None);
    }
}
