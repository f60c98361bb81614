use crate::extractor::ExtractionError;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// One file stored in an archive
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Uncompressed bytes still allowed to be read during one extraction
#[derive(Debug)]
pub struct ByteBudget {
    limit: u64,
    used: u64,
}

impl ByteBudget {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    fn charge(&mut self, bytes: u64) -> Result<(), ExtractionError> {
        self.used = self.used.saturating_add(bytes);
        if self.used > self.limit {
            return Err(ExtractionError::SizeExceeded { limit: self.limit });
        }
        Ok(())
    }
}

/// Read every entry of a ZIP archive, in archive order. Directory entries are
/// kept as empty members so they show up like any other undecodable name.
///
/// Members are read through the shared budget so an archive bomb stops at the
/// cap instead of being inflated in full.
pub fn read_members(
    bytes: &[u8],
    budget: &mut ByteBudget,
) -> Result<Vec<ArchiveMember>, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Archive(e.to_string()))?;

    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| ExtractionError::Archive(format!("failed to read entry {}: {}", i, e)))?;

        let name = file.name().to_string();
        if file.is_dir() {
            members.push(ArchiveMember {
                name,
                bytes: Vec::new(),
            });
            continue;
        }

        // One byte over the remaining budget is enough to detect the overflow
        let mut contents = Vec::new();
        file.take(budget.remaining().saturating_add(1))
            .read_to_end(&mut contents)
            .map_err(|e| ExtractionError::Archive(format!("failed to inflate {}: {}", name, e)))?;
        budget.charge(contents.len() as u64)?;

        members.push(ArchiveMember {
            name,
            bytes: contents,
        });
    }

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::fixtures::zip_bytes;

    #[test]
    fn test_read_members_in_order() {
        let archive = zip_bytes(&[("b.txt", b"second"), ("a.txt", b"first")]);
        let mut budget = ByteBudget::new(1024);

        let members = read_members(&archive, &mut budget).unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
        assert_eq!(members[0].bytes, b"second");
        assert_eq!(budget.remaining(), 1024 - 11);
    }

    #[test]
    fn test_read_members_keeps_directories_empty() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("docs/", zip::write::FileOptions::default())
            .unwrap();
        writer
            .start_file("docs/terms.txt", zip::write::FileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut writer, b"terms").unwrap();
        let archive = writer.finish().unwrap().into_inner();

        let members = read_members(&archive, &mut ByteBudget::new(1024)).unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["docs/", "docs/terms.txt"]);
        assert!(members[0].bytes.is_empty());
        assert_eq!(members[1].bytes, b"terms");
    }

    #[test]
    fn test_read_members_budget_exceeded() {
        let archive = zip_bytes(&[("big.txt", &[b'a'; 64])]);
        let mut budget = ByteBudget::new(16);

        let err = read_members(&archive, &mut budget).unwrap_err();
        assert_eq!(err, ExtractionError::SizeExceeded { limit: 16 });
    }

    #[test]
    fn test_read_members_not_an_archive() {
        let err = read_members(b"definitely not a zip", &mut ByteBudget::new(1024)).unwrap_err();
        assert_eq!(err.kind(), "archive");
    }
}
