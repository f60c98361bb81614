use crate::constants::CSV_EXTENSIONS;
use crate::extractor::types::table::render_table;
use crate::extractor::{DocumentDecoder, ExtractionError};

/// CSV decoder: first record is the header, the whole file is rendered as a table
pub struct CsvDecoder;

impl CsvDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for CsvDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| ExtractionError::Table(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ExtractionError::Table(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(render_table(&headers, &rows))
    }

    fn suffixes(&self) -> &[&str] {
        CSV_EXTENSIONS
    }
}
