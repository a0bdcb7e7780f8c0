//! Ingestion result types.
//!
//! `ParsedFile` is transient: produced per send action, rendered into the
//! outgoing model context, and never persisted.

use std::fmt;
use std::path::Path;

/// Normalized file category used to dispatch ingestion.
///
/// Derived from the declared MIME type first, falling back to the filename
/// extension. The mapping mirrors the upload accept-hint: documents and
/// common code/text files are extracted, images get a placeholder,
/// everything else is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Pdf,
    Word,
    Text,
    Image,
    Unsupported,
}

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "js", "ts", "jsx", "tsx", "css", "rs", "py", "toml", "yaml", "yml",
];

impl FileCategory {
    #[must_use]
    pub fn from_declared(mime: Option<&str>, name: &str) -> Self {
        if let Some(mime) = mime {
            let mime = mime.trim().to_ascii_lowercase();
            match mime.as_str() {
                "application/pdf" => return Self::Pdf,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    return Self::Word;
                }
                "text/plain" | "text/markdown" | "application/json" | "text/javascript"
                | "text/css" => return Self::Text,
                _ => {
                    if mime.starts_with("image/") {
                        return Self::Image;
                    }
                }
            }
        }
        Self::from_extension(name)
    }

    fn from_extension(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Word,
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "svg") => Self::Image,
            Some(ext) if TEXT_EXTENSIONS.contains(&ext) => Self::Text,
            _ => Self::Unsupported,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Text => "text",
            Self::Image => "image",
            Self::Unsupported => "unknown",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The outcome of ingesting one attachment.
///
/// Ingestion is total: a failure becomes `error` plus a placeholder
/// `content`, never a propagated `Err`.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub name: String,
    pub category: FileCategory,
    pub content: String,
    pub error: Option<String>,
    pub size: u64,
}

impl ParsedFile {
    /// Render this file as a block of the outgoing model context.
    #[must_use]
    pub fn context_block(&self) -> String {
        let header = format!("[File: {} ({})]", self.name, self.category);
        match &self.error {
            Some(error) => format!("{header}\nError: {error}"),
            None => format!("{header}\nContent:\n{}", self.content),
        }
    }
}

/// Human-readable size, matching the placeholder text for images.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
