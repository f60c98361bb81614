use crate::constants::HTML_EXTENSIONS;
use crate::extractor::{DocumentDecoder, ExtractionError};
use scraper::{Html, Node};

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// HTML decoder: visible text nodes, one block per line
pub struct HtmlDecoder;

impl HtmlDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for HtmlDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        // Invalid UTF-8 sequences are dropped rather than replaced
        let html = String::from_utf8_lossy(bytes).replace('\u{FFFD}', "");
        let document = Html::parse_document(&html);

        let mut blocks = Vec::new();
        for node in document.tree.root().descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };

            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name().to_string()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name.as_str()));
            if hidden {
                continue;
            }

            let content = text.trim();
            if !content.is_empty() {
                blocks.push(content.to_string());
            }
        }

        Ok(blocks.join("\n"))
    }

    fn suffixes(&self) -> &[&str] {
        HTML_EXTENSIONS
    }
}
