pub mod csv;
pub mod docx;
pub mod html;
pub mod image;
pub mod pdf;
pub mod spreadsheet;
pub mod table;
pub mod zip;

pub use self::csv::CsvDecoder;
pub use self::docx::DocxDecoder;
pub use self::html::HtmlDecoder;
pub use self::image::ImageDecoder;
pub use self::pdf::PdfDecoder;
pub use self::spreadsheet::SpreadsheetDecoder;
pub use self::zip::{read_members, ArchiveMember, ByteBudget};
