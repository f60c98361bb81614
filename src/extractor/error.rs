use thiserror::Error;

/// Why a document could not be turned into text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("archive error: {0}")]
    Archive(String),

    #[error("document error: {0}")]
    Document(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("archive nesting exceeds maximum depth of {max}")]
    DepthExceeded { max: usize },

    #[error("archive content exceeds {limit} bytes")]
    SizeExceeded { limit: u64 },

    #[error("decoder panicked: {0}")]
    Panicked(String),
}

impl ExtractionError {
    /// Short, stable label of the failure kind (for logs and counters)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Archive(_) => "archive",
            Self::Document(_) => "document",
            Self::Pdf(_) => "pdf",
            Self::Table(_) => "table",
            Self::Image(_) => "image",
            Self::Ocr(_) => "ocr",
            Self::DepthExceeded { .. } => "depth_exceeded",
            Self::SizeExceeded { .. } => "size_exceeded",
            Self::Panicked(_) => "panicked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ExtractionError::DepthExceeded { max: 3 }.to_string(),
            "archive nesting exceeds maximum depth of 3"
        );
        assert_eq!(
            ExtractionError::Pdf("invalid file header".to_string()).to_string(),
            "PDF error: invalid file header"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ExtractionError::SizeExceeded { limit: 10 }.kind(), "size_exceeded");
        assert_eq!(ExtractionError::Ocr(String::new()).kind(), "ocr");
    }
}
