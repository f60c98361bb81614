use crate::constants::IMAGE_EXTENSIONS;
use crate::extractor::{DocumentDecoder, ExtractionError};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Executable used for OCR when the in-process binding is not compiled in
const TESSERACT_COMMAND: &str = "tesseract";

/// Raster image decoder: decode, convert to grayscale PNG, run OCR.
///
/// With the `ocr` feature Tesseract is linked in; otherwise the `tesseract`
/// executable is run with the PNG on stdin.
pub struct ImageDecoder {
    languages: String,
    command: String,
}

impl ImageDecoder {
    /// `languages` uses the Tesseract `+`-joined form, e.g. `fra+ara+eng`
    pub fn new(languages: &str) -> Self {
        Self {
            languages: languages.to_string(),
            command: TESSERACT_COMMAND.to_string(),
        }
    }

    /// Use another Tesseract executable (path or name on `PATH`)
    pub fn with_command(mut self, command: &str) -> Self {
        self.command = command.to_string();
        self
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn prepare(image: DynamicImage) -> Result<Vec<u8>, ExtractionError> {
        let mut png = Vec::new();
        image
            .grayscale()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| ExtractionError::Image(e.to_string()))?;
        Ok(png)
    }
}

impl DocumentDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| ExtractionError::Image(e.to_string()))?;
        let png = Self::prepare(image)?;
        self.recognize(&png)
    }

    fn suffixes(&self) -> &[&str] {
        IMAGE_EXTENSIONS
    }
}

fn ocr_error<E: std::fmt::Display>(e: E) -> ExtractionError {
    ExtractionError::Ocr(e.to_string())
}

impl ImageDecoder {
    #[cfg(feature = "ocr")]
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractionError> {
        let mut tesseract = tesseract::Tesseract::new(None, Some(&self.languages))
            .map_err(ocr_error)?
            .set_image_from_mem(png)
            .map_err(ocr_error)?
            .recognize()
            .map_err(ocr_error)?;

        tesseract.get_text().map_err(ocr_error)
    }

    #[cfg(not(feature = "ocr"))]
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractionError> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.languages.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExtractionError::Ocr(format!("cannot run {}: {}", self.command, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(png).map_err(ocr_error)?;
        }

        let output = child.wait_with_output().map_err(ocr_error)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
