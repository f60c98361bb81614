use crate::extractor::ExtractionError;
use crate::utils;

/// Decoder turning the raw bytes of one document format into text
pub trait DocumentDecoder: Send + Sync {
    /// Decode raw bytes into (not yet normalized) text
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError>;

    /// File name suffixes, with the leading dot, handled by this decoder
    fn suffixes(&self) -> &[&str];

    /// Check if this decoder handles the given file name
    fn supports(&self, name: &str) -> bool {
        utils::has_suffix(name, self.suffixes())
    }
}
