use crate::config::TextPolicy;
use crate::constants::ARCHIVE_EXTENSIONS;
use crate::extractor::types::{
    CsvDecoder, DocxDecoder, HtmlDecoder, ImageDecoder, PdfDecoder, SpreadsheetDecoder,
};
use crate::extractor::DocumentDecoder;
use crate::utils;
use std::sync::Arc;

/// What to do with a document, decided from its name alone
#[derive(Clone)]
pub enum Dispatch {
    /// Walk the archive and extract every member
    Archive,
    /// Decode with a format decoder
    Decode(Arc<dyn DocumentDecoder>),
    /// No decoder applies
    Unsupported,
}

/// Ordered set of decoders; the first one whose suffix matches wins
pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn DocumentDecoder>>,
}

impl DecoderRegistry {
    /// Create a registry with the built-in decoders
    pub fn new(policy: &TextPolicy) -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(DocxDecoder::new()));
        registry.register(Arc::new(PdfDecoder::new()));
        registry.register(Arc::new(CsvDecoder::new()));
        registry.register(Arc::new(SpreadsheetDecoder::new()));
        registry.register(Arc::new(HtmlDecoder::new()));
        registry.register(Arc::new(ImageDecoder::new(&policy.ocr_languages)));

        registry
    }

    /// Registry without any decoder; archives are still recognised
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Register a new decoder after the existing ones
    pub fn register(&mut self, decoder: Arc<dyn DocumentDecoder>) {
        self.decoders.push(decoder);
    }

    /// Pick the handling for a file name (case-insensitive suffix match, content is never sniffed)
    pub fn dispatch(&self, name: &str) -> Dispatch {
        if utils::has_suffix(name, ARCHIVE_EXTENSIONS) {
            return Dispatch::Archive;
        }

        self.decoders
            .iter()
            .find(|decoder| decoder.supports(name))
            .map(|decoder| Dispatch::Decode(decoder.clone()))
            .unwrap_or(Dispatch::Unsupported)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new(&TextPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder_for(name: &str) -> Option<Arc<dyn DocumentDecoder>> {
        match DecoderRegistry::default().dispatch(name) {
            Dispatch::Decode(decoder) => Some(decoder),
            _ => None,
        }
    }

    #[test]
    fn test_registry_archive() {
        assert!(matches!(
            DecoderRegistry::default().dispatch("bundle.ZIP"),
            Dispatch::Archive
        ));
    }

    #[test]
    fn test_registry_known_formats() {
        for name in [
            "a.docx", "b.pdf", "c.csv", "d.xls", "e.xlsx", "f.html", "g.HTM", "h.png", "i.jpeg",
            "j.tiff", "k.webp",
        ] {
            let decoder = decoder_for(name).unwrap_or_else(|| panic!("no decoder for {name}"));
            assert!(decoder.supports(name));
        }
    }

    #[test]
    fn test_registry_unsupported() {
        for name in ["report.xyz", "legacy.doc", "notes.txt", "noextension"] {
            assert!(matches!(
                DecoderRegistry::default().dispatch(name),
                Dispatch::Unsupported
            ));
        }
    }

    #[test]
    fn test_empty_registry_still_detects_archives() {
        let registry = DecoderRegistry::empty();
        assert!(matches!(registry.dispatch("x.zip"), Dispatch::Archive));
        assert!(matches!(registry.dispatch("x.pdf"), Dispatch::Unsupported));
    }
}
