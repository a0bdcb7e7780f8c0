//! Raw text extraction for .docx files.
//!
//! A .docx is a zip container; the document body lives in
//! `word/document.xml`. Text runs are `<w:t>` elements and paragraphs end
//! with `</w:p>`, which is all the structure raw-text extraction needs -
//! no full XML parse required.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;

fn run_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<w:t[^>]*>([^<]*)</w:t>").expect("static pattern compiles"))
}

pub(crate) fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| e.to_string())?
        .read_to_string(&mut document)
        .map_err(|e| e.to_string())?;

    let mut lines = Vec::new();
    for paragraph in document.split("</w:p>") {
        let mut line = String::new();
        for run in run_pattern().captures_iter(paragraph) {
            line.push_str(&unescape_xml(&run[1]));
        }
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    Ok(lines.join("\n").trim().to_string())
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            writer
                .write_all(format!("<w:document><w:body>{body}</w:body></w:document>").as_bytes())
                .unwrap();
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn runs_concatenate_and_paragraphs_break() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second line</w:t></w:r></w:p>",
        );
        assert_eq!(extract_text(&bytes).unwrap(), "Hello world\nSecond line");
    }

    #[test]
    fn entities_are_unescaped() {
        let bytes = docx_with_body("<w:p><w:t>a &amp; b &lt;c&gt;</w:t></w:p>");
        assert_eq!(extract_text(&bytes).unwrap(), "a & b <c>");
    }

    #[test]
    fn preserved_space_attribute_is_tolerated() {
        let bytes = docx_with_body("<w:p><w:t xml:space=\"preserve\"> padded </w:t></w:p>");
        assert_eq!(extract_text(&bytes).unwrap(), "padded");
    }

    #[test]
    fn not_a_zip_is_an_error() {
        assert!(extract_text(b"plain bytes").is_err());
    }

    #[test]
    fn zip_without_document_xml_is_an_error() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("other.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"hi").unwrap();
            writer.finish().unwrap();
        }
        assert!(extract_text(&buf.into_inner()).is_err());
    }
}
