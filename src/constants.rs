/// Constants shared by the extractor and the tender processor

/// Archive suffixes opened and walked member by member
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".zip"];

/// Word processor documents we can parse
pub const DOCX_EXTENSIONS: &[&str] = &[".docx"];

pub const PDF_EXTENSIONS: &[&str] = &[".pdf"];

pub const CSV_EXTENSIONS: &[&str] = &[".csv"];

pub const SPREADSHEET_EXTENSIONS: &[&str] = &[".xls", ".xlsx"];

pub const HTML_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Raster formats sent through OCR
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".tiff", ".webp"];

/// Suffixes grouped under the DOC category for additional documents
/// (`.doc` has no decoder but is still filed as a word document)
pub const DOC_CATEGORY_EXTENSIONS: &[&str] = &[".doc", ".docx"];

/// Separator between documents of the same category
pub const DOCUMENT_DELIMITER: &str = "\n---\n";

/// Separator between category sections
pub const SECTION_DELIMITER: &str = "\n\n";

/// Heading prefix of a category section in `additional_text_all`
pub const SECTION_HEADING: &str = "Name of the documents";

/// Punctuation and symbols kept by the normalizer besides letters, digits and whitespace
pub const ALLOWED_SYMBOLS: &[char] = &[
    '.', ',', ';', ':', '?', '!', '\'', '"', '(', ')', '-', '/', '%', '€', '$', '@', '#',
];

/// File name used when a URL has no usable final path segment
pub const FALLBACK_FILE_NAME: &str = "document";
