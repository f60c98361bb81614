use crate::constants::SPREADSHEET_EXTENSIONS;
use crate::extractor::types::table::render_table;
use crate::extractor::{DocumentDecoder, ExtractionError};
use calamine::{open_workbook_auto_from_rs, Reader};
use std::io::Cursor;

/// Spreadsheet (.xls / .xlsx) decoder: first worksheet, rendered like CSV
pub struct SpreadsheetDecoder;

impl SpreadsheetDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpreadsheetDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for SpreadsheetDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ExtractionError::Table(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ExtractionError::Table("workbook has no worksheet".to_string()))?
            .map_err(|e| ExtractionError::Table(e.to_string()))?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());

        let headers = rows.next().unwrap_or_default();
        let body: Vec<Vec<String>> = rows.collect();

        Ok(render_table(&headers, &body))
    }

    fn suffixes(&self) -> &[&str] {
        SPREADSHEET_EXTENSIONS
    }
}
