use crate::constants::DOCX_EXTENSIONS;
use crate::extractor::{DocumentDecoder, ExtractionError};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word processor (.docx) decoder: paragraph texts joined with newlines
pub struct DocxDecoder;

impl DocxDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for DocxDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut package = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::Document(format!("not a DOCX package: {}", e)))?;

        let mut xml = String::new();
        package
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractionError::Document(format!("missing {}: {}", DOCUMENT_PART, e)))?
            .read_to_string(&mut xml)
            .map_err(|e| ExtractionError::Document(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;

        Ok(paragraphs(&xml)?.join("\n"))
    }

    fn suffixes(&self) -> &[&str] {
        DOCX_EXTENSIONS
    }
}

/// Collect the text of every `w:p` element, honouring tabs and line breaks
fn paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                b"p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let text = text
                    .unescape()
                    .map_err(|e| ExtractionError::Document(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::Document(format!(
                    "malformed {} at position {}: {}",
                    DOCUMENT_PART,
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
