pub mod error;
pub mod factory;
pub mod r#trait;
pub mod types;

pub use error::ExtractionError;
pub use factory::{DecoderRegistry, Dispatch};
pub use r#trait::DocumentDecoder;

use crate::config::{ExtractionConfig, TextPolicy};
use crate::normalizer::TextNormalizer;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use types::{read_members, ArchiveMember, ByteBudget};

/// Outcome of extracting one document.
///
/// Failures keep their kind until the record is serialized; `Display` gives the
/// text that ends up in the tender record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Normalized text (possibly empty)
    Text(String),
    /// No decoder for this file name
    Unsupported { name: String },
    /// A decoder failed
    Failed { name: String, error: ExtractionError },
}

impl Extraction {
    fn failed(name: impl Into<String>, error: ExtractionError) -> Self {
        Self::Failed {
            name: name.into(),
            error,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Failure kind, if any (`unsupported` for files without a decoder)
    pub fn failure_kind(&self) -> Option<&'static str> {
        match self {
            Self::Text(_) => None,
            Self::Unsupported { .. } => Some("unsupported"),
            Self::Failed { error, .. } => Some(error.kind()),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Unsupported { name } => {
                write!(f, "[Binary file: {}, cannot extract text]", name)
            }
            Self::Failed { name, error } => {
                write!(f, "[Error extracting from {}: {}]", name, error)
            }
        }
    }
}

/// Archive being walked: members not visited yet and the text gathered so far
struct ArchiveFrame {
    depth: usize,
    pending: std::vec::IntoIter<ArchiveMember>,
    text: String,
}

impl ArchiveFrame {
    fn append(&mut self, result: Extraction) {
        self.text.push_str(&result.into_text());
        self.text.push('\n');
    }
}

enum Step {
    Enter(ArchiveFrame),
    Leaf(Extraction),
    Finished,
}

/// Format-dispatching text extractor.
///
/// Dispatch is a case-insensitive suffix match on the document name. Archives
/// are walked with an explicit stack rather than recursion, bounded by
/// `max_archive_depth` and a byte budget shared by the whole extraction.
/// Nothing escapes `extract`: decoder errors and panics become
/// [`Extraction::Failed`].
#[derive(Clone)]
pub struct Extractor {
    registry: Arc<DecoderRegistry>,
    normalizer: TextNormalizer,
    limits: ExtractionConfig,
}

impl Extractor {
    pub fn new(policy: &TextPolicy, limits: ExtractionConfig) -> Self {
        Self::with_registry(DecoderRegistry::new(policy), TextNormalizer::new(policy), limits)
    }

    pub fn with_registry(
        registry: DecoderRegistry,
        normalizer: TextNormalizer,
        limits: ExtractionConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            normalizer,
            limits,
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Extract text from a document given its raw bytes and name
    pub fn extract(&self, name: &str, bytes: &[u8]) -> Extraction {
        let name = name.to_lowercase();

        match self.registry.dispatch(&name) {
            Dispatch::Archive => self.extract_archive(name, bytes),
            Dispatch::Decode(decoder) => self.decode(name, bytes, decoder.as_ref()),
            Dispatch::Unsupported => Extraction::Unsupported { name },
        }
    }

    /// Run [`Extractor::extract`] on the blocking thread pool
    pub async fn extract_async(&self, name: String, bytes: Vec<u8>) -> Extraction {
        let extractor = self.clone();
        let task_name = name.clone();

        match tokio::task::spawn_blocking(move || extractor.extract(&task_name, &bytes)).await {
            Ok(extraction) => extraction,
            Err(e) => Extraction::failed(name.to_lowercase(), ExtractionError::Panicked(e.to_string())),
        }
    }

    fn decode(&self, name: String, bytes: &[u8], decoder: &dyn DocumentDecoder) -> Extraction {
        match catch_panic(|| decoder.decode(bytes)) {
            Ok(text) => Extraction::Text(self.normalizer.normalize(&text)),
            Err(error) => Extraction::failed(name, error),
        }
    }

    fn open(&self, bytes: &[u8], depth: usize, budget: &mut ByteBudget) -> Result<ArchiveFrame, ExtractionError> {
        let members = catch_panic(|| read_members(bytes, budget))?;
        Ok(ArchiveFrame {
            depth,
            pending: members.into_iter(),
            text: String::new(),
        })
    }

    fn visit(&self, member: ArchiveMember, depth: usize, budget: &mut ByteBudget) -> Step {
        let name = member.name.to_lowercase();

        match self.registry.dispatch(&name) {
            Dispatch::Archive => {
                let depth = depth + 1;
                if depth > self.limits.max_archive_depth {
                    let max = self.limits.max_archive_depth;
                    return Step::Leaf(Extraction::failed(name, ExtractionError::DepthExceeded { max }));
                }
                match self.open(&member.bytes, depth, budget) {
                    Ok(frame) => Step::Enter(frame),
                    Err(error) => Step::Leaf(Extraction::failed(name, error)),
                }
            }
            Dispatch::Decode(decoder) => Step::Leaf(self.decode(name, &member.bytes, decoder.as_ref())),
            Dispatch::Unsupported => Step::Leaf(Extraction::Unsupported { name }),
        }
    }

    /// Every member result followed by a newline, each archive normalized as a whole,
    /// in the same order a depth-first recursive walk would produce.
    fn extract_archive(&self, name: String, bytes: &[u8]) -> Extraction {
        let mut budget = ByteBudget::new(self.limits.max_total_bytes);

        let root = match self.open(bytes, 1, &mut budget) {
            Ok(frame) => frame,
            Err(error) => return Extraction::failed(name, error),
        };

        let mut stack = vec![root];
        while let Some(frame) = stack.last_mut() {
            let step = match frame.pending.next() {
                Some(member) => self.visit(member, frame.depth, &mut budget),
                None => Step::Finished,
            };

            match step {
                Step::Enter(child) => stack.push(child),
                Step::Leaf(result) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.append(result);
                    }
                }
                Step::Finished => {
                    let Some(done) = stack.pop() else { break };
                    let result = Extraction::Text(self.normalizer.normalize(&done.text));
                    match stack.last_mut() {
                        Some(parent) => parent.append(result),
                        None => return result,
                    }
                }
            }
        }

        // the root frame always returns above
        Extraction::Text(String::new())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&TextPolicy::default(), ExtractionConfig::default())
    }
}

fn catch_panic<T, F>(f: F) -> Result<T, ExtractionError>
where
    F: FnOnce() -> Result<T, ExtractionError>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(ExtractionError::Panicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
