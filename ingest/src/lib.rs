//! Attachment ingestion: uploaded files to plain text for the model prompt.
//!
//! Ingestion is total. [`parse_file`] always returns a [`ParsedFile`]; any
//! failure (oversized file, unsupported type, decode error) is captured in
//! the result's `error` field with a placeholder `content`, never propagated
//! to the caller. Multiple attachments are parsed concurrently and the
//! output order matches the input order regardless of completion order.

mod docx;
mod pdf;

use std::path::Path;

use banter_types::{FileCategory, ParsedFile, format_file_size};
use futures_util::future::join_all;

/// Ceiling on raw attachment size.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Ceiling on extracted text, in characters.
pub const MAX_TEXT_CHARS: usize = 50_000;

const TRUNCATION_MARKER: &str = "\n[Content truncated due to length...]";

/// One attachment as handed over by the UI: a name, the declared MIME type
/// (if any), and the raw bytes.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub name: String,
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileSource {
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            bytes,
        }
    }

    #[must_use]
    pub fn category(&self) -> FileCategory {
        FileCategory::from_declared(self.declared_type.as_deref(), &self.name)
    }
}

#[derive(Debug, thiserror::Error)]
enum ExtractError {
    #[error("File too large. Maximum size is 10MB.")]
    TooLarge,
    #[error("Unsupported file type")]
    Unsupported,
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("Word extraction failed: {0}")]
    Docx(String),
    #[error("{0}")]
    Read(String),
}

/// Ingest a single attachment. Never fails and never panics; see the
/// crate-level contract.
pub async fn parse_file(source: &FileSource) -> ParsedFile {
    let category = source.category();
    match extract(category, source) {
        Ok(content) => ParsedFile {
            name: source.name.clone(),
            category,
            content: truncate_content(content),
            error: None,
            size: source.bytes.len() as u64,
        },
        Err(e) => failed(&source.name, category, source.bytes.len() as u64, &e),
    }
}

/// Ingest a batch concurrently. Result order equals input order.
pub async fn parse_files(sources: &[FileSource]) -> Vec<ParsedFile> {
    join_all(sources.iter().map(parse_file)).await
}

/// Ingest a file from disk. Read errors become per-file error results, the
/// same as any extraction failure.
pub async fn parse_path(path: &Path) -> ParsedFile {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let category = FileCategory::from_declared(None, &name);

    // Check the size up front so an oversized file is rejected without
    // pulling it into memory.
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > MAX_FILE_BYTES => {
            return failed(&name, category, meta.len(), &ExtractError::TooLarge);
        }
        Ok(_) => {}
        Err(e) => {
            return failed(&name, category, 0, &ExtractError::Read(e.to_string()));
        }
    }

    match tokio::fs::read(path).await {
        Ok(bytes) => parse_file(&FileSource::new(name, None, bytes)).await,
        Err(e) => failed(&name, category, 0, &ExtractError::Read(e.to_string())),
    }
}

/// Ingest several paths concurrently, preserving input order.
pub async fn parse_paths(paths: &[std::path::PathBuf]) -> Vec<ParsedFile> {
    join_all(paths.iter().map(|p| parse_path(p))).await
}

/// Dispatch table keyed by normalized file category.
fn extract(category: FileCategory, source: &FileSource) -> Result<String, ExtractError> {
    if source.bytes.len() as u64 > MAX_FILE_BYTES {
        return Err(ExtractError::TooLarge);
    }
    match category {
        FileCategory::Pdf => pdf::extract_text(&source.bytes).map_err(ExtractError::Pdf),
        FileCategory::Word => docx::extract_text(&source.bytes).map_err(ExtractError::Docx),
        FileCategory::Text => Ok(extract_plain_text(&source.bytes)),
        FileCategory::Image => Ok(format!(
            "[Image: {} ({})]",
            source.name,
            format_file_size(source.bytes.len() as u64)
        )),
        FileCategory::Unsupported => Err(ExtractError::Unsupported),
    }
}

fn extract_plain_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

fn failed(name: &str, category: FileCategory, size: u64, error: &ExtractError) -> ParsedFile {
    tracing::debug!(file = name, %error, "attachment ingestion failed");
    ParsedFile {
        name: name.to_string(),
        category,
        content: format!("[Failed to parse file: {error}]"),
        error: Some(format!("Error parsing {name}: {error}")),
        size,
    }
}

fn truncate_content(content: String) -> String {
    match content.char_indices().nth(MAX_TEXT_CHARS) {
        Some((byte_idx, _)) => {
            let mut truncated = content[..byte_idx].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_source(name: &str, content: &str) -> FileSource {
        FileSource::new(name, Some("text/plain".to_string()), content.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn plain_text_is_trimmed() {
        let parsed = parse_file(&text_source("note.txt", "  hello world \n")).await;
        assert!(parsed.error.is_none());
        assert_eq!(parsed.content, "hello world");
        assert_eq!(parsed.size, 15);
    }

    #[tokio::test]
    async fn oversized_file_yields_error_not_panic() {
        let bytes = vec![b'a'; 15 * 1024 * 1024];
        let source = FileSource::new("big.txt", Some("text/plain".to_string()), bytes);
        let parsed = parse_file(&source).await;
        let error = parsed.error.expect("oversized file must carry an error");
        assert!(error.contains("File too large"));
        assert!(parsed.content.starts_with("[Failed to parse file:"));
    }

    #[tokio::test]
    async fn long_text_truncates_to_exactly_the_limit() {
        let parsed = parse_file(&text_source("long.txt", &"x".repeat(60_000))).await;
        assert!(parsed.error.is_none());
        assert!(parsed.content.ends_with(TRUNCATION_MARKER));
        let kept = parsed.content.len() - TRUNCATION_MARKER.len();
        assert_eq!(kept, MAX_TEXT_CHARS);
    }

    #[tokio::test]
    async fn truncation_respects_char_boundaries() {
        let parsed = parse_file(&text_source("uni.txt", &"é".repeat(50_001))).await;
        assert!(parsed.content.ends_with(TRUNCATION_MARKER));
        let kept = &parsed.content[..parsed.content.len() - TRUNCATION_MARKER.len()];
        assert_eq!(kept.chars().count(), MAX_TEXT_CHARS);
    }

    #[tokio::test]
    async fn image_gets_placeholder_without_extraction() {
        let source = FileSource::new("pic.png", Some("image/png".to_string()), vec![0u8; 2048]);
        let parsed = parse_file(&source).await;
        assert!(parsed.error.is_none());
        assert_eq!(parsed.content, "[Image: pic.png (2.0 KB)]");
    }

    #[tokio::test]
    async fn unknown_type_is_unsupported() {
        let source = FileSource::new("blob.xyz", None, vec![1, 2, 3]);
        let parsed = parse_file(&source).await;
        assert_eq!(
            parsed.error.as_deref(),
            Some("Error parsing blob.xyz: Unsupported file type")
        );
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let sources = vec![
            text_source("a.txt", "first"),
            FileSource::new("b.xyz", None, vec![]),
            text_source("c.txt", "third"),
        ];
        let parsed = parse_files(&sources).await;
        let names: Vec<_> = parsed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.xyz", "c.txt"]);
        assert!(parsed[1].error.is_some());
    }

    #[tokio::test]
    async fn missing_path_reports_read_error() {
        let parsed = parse_path(Path::new("/definitely/not/here.txt")).await;
        assert!(parsed.error.is_some());
        assert!(parsed.content.starts_with("[Failed to parse file:"));
    }

    #[tokio::test]
    async fn path_ingestion_reads_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# heading\n").unwrap();
        let parsed = parse_path(&path).await;
        assert!(parsed.error.is_none());
        assert_eq!(parsed.content, "# heading");
        assert_eq!(parsed.name, "note.md");
    }
}
