use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::core::document::Document;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON array: {0}")]
    InvalidArray(serde_json::Error),

    #[error("Invalid JSON on line {line}: {source}")]
    InvalidLine {
        line: usize,
        source: serde_json::Error,
    },

    #[error("No documents found in input")]
    Empty,
}

/// Read documents from a file, or from stdin when the path is `-`
///
/// # Errors
///
/// Returns `ParseError::Io` if the input cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_documents_file(path: &Path) -> Result<Vec<Document>, ParseError> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_documents_text(&content)
}

/// Parse documents from a JSON array or from JSON Lines
///
/// # Errors
///
/// Returns `ParseError::InvalidArray` or `ParseError::InvalidLine` for
/// malformed JSON, or `ParseError::Empty` if no documents are present.
pub fn parse_documents_text(text: &str) -> Result<Vec<Document>, ParseError> {
    let trimmed = text.trim_start();

    let documents = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<Document>>(trimmed).map_err(ParseError::InvalidArray)?
    } else {
        let mut documents = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Line numbers in errors are 1-based for user friendliness
            let document = serde_json::from_str(line)
                .map_err(|source| ParseError::InvalidLine { line: i + 1, source })?;
            documents.push(document);
        }
        documents
    };

    if documents.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(documents)
}
