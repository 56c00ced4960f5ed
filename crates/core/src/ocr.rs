//! Built-in OCR implementation for plain-text documents.
//!
//! Real deployments put a network OCR engine behind the [`OcrService`] port.
//! For documents that are already text (and for the CLI and tests) this
//! implementation simply decodes the stored bytes as UTF-8 and splits them
//! into lines, which matches what an OCR engine emits for a digital
//! transcript.

use crate::error::{CoreError, CoreResult};
use crate::ports::OcrService;

/// Reads the document bytes as UTF-8 text, one recognised line per text line.
#[derive(Debug, Default, Clone)]
pub struct PlainTextOcr;

impl PlainTextOcr {
    pub fn new() -> Self {
        Self
    }
}

impl OcrService for PlainTextOcr {
    fn recognize(&self, document: &[u8]) -> CoreResult<Vec<String>> {
        let text = std::str::from_utf8(document).map_err(|e| {
            CoreError::Unprocessable(format!("document is not valid UTF-8 text: {}", e))
        })?;
        Ok(text.lines().map(|line| line.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_splits_lines_in_order() {
        let lines = PlainTextOcr::new()
            .recognize("first\nsecond\nthird".as_bytes())
            .unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_recognize_handles_trailing_newline() {
        let lines = PlainTextOcr::new().recognize("only\n".as_bytes()).unwrap();
        assert_eq!(lines, vec!["only"]);
    }

    #[test]
    fn test_recognize_rejects_non_utf8() {
        let result = PlainTextOcr::new().recognize(&[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(CoreError::Unprocessable(_))));
    }

    #[test]
    fn test_recognize_empty_document() {
        let lines = PlainTextOcr::new().recognize(b"").unwrap();
        assert!(lines.is_empty());
    }
}
