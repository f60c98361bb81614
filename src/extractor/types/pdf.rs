use crate::constants::PDF_EXTENSIONS;
use crate::extractor::{DocumentDecoder, ExtractionError};
use lopdf::Document;

/// PDF decoder: per-page text, pages without text are skipped
pub struct PdfDecoder;

impl PdfDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for PdfDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        let pages: Vec<String> = doc
            .get_pages()
            .keys()
            .filter_map(|page_num| match doc.extract_text(&[*page_num]) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::debug!("Skipping PDF page {}: {}", page_num, e);
                    None
                }
            })
            .filter(|text| !text.trim().is_empty())
            .collect();

        if !pages.is_empty() {
            return Ok(pages.join("\n"));
        }

        // Fallback: pdf-extract copes with some fonts lopdf cannot map
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) => Ok(text.trim().to_string()),
            Err(_) => Ok(String::new()),
        }
    }

    fn suffixes(&self) -> &[&str] {
        PDF_EXTENSIONS
    }
}
