//! Pure-Rust text extraction for uploaded documents.
//!
//! Every format is flattened to plain lines and then normalized:
//!   PDF  → one line block per page, page order preserved
//!   DOCX → one line per body paragraph, document order
//!   TXT  → strict UTF-8

use std::io::Read;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::core::errors::{AppError, AppResult};
use crate::parser::types::{Document, DocumentFormat, NormalizedText};

const UTF8_BOM: &str = "\u{feff}";

// ─────────────────────────────────────────────────────────────────────────────

/// Extracts and normalizes the text of `raw_bytes`, dispatching on the
/// extension hint.
pub fn extract(raw_bytes: &[u8], extension: &str) -> AppResult<NormalizedText> {
    let format = DocumentFormat::from_extension(extension)?;
    extract_format(raw_bytes, format)
}

pub fn extract_document(document: &Document) -> AppResult<NormalizedText> {
    extract_format(&document.raw_bytes, document.format)
}

fn extract_format(raw_bytes: &[u8], format: DocumentFormat) -> AppResult<NormalizedText> {
    let raw = match format {
        DocumentFormat::Pdf => extract_pdf(raw_bytes)?,
        DocumentFormat::Docx => extract_docx(raw_bytes)?,
        DocumentFormat::Txt => extract_txt(raw_bytes)?,
    };

    let text = NormalizedText::new(&raw);
    if text.is_empty() {
        return Err(AppError::EmptyDocument(
            "no text remains after extraction".to_string(),
        ));
    }
    debug!(
        format = ?format,
        bytes = raw_bytes.len(),
        chars = text.char_count(),
        lines = text.line_count(),
        "extracted document text"
    );
    Ok(text)
}

// ── PDF ───────────────────────────────────────────────────────────────────────

fn extract_pdf(bytes: &[u8]) -> AppResult<String> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| AppError::ExtractionFailed("pdf parser aborted on malformed input".to_string()))?
    .map_err(|e| AppError::ExtractionFailed(format!("pdf-extract failed: {e}")))?;

    Ok(join_pages(&pages))
}

/// Each page contributes its text plus a newline; blank pages still
/// contribute the newline.
fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref().trim_end_matches(['\r', '\n']));
        text.push('\n');
    }
    text
}

// ── DOCX ──────────────────────────────────────────────────────────────────────

fn extract_docx(bytes: &[u8]) -> AppResult<String> {
    let paragraphs = match paragraphs_with_docx_rs(bytes) {
        Ok(paragraphs) => paragraphs,
        Err(primary_err) => match paragraphs_with_xml_fallback(bytes) {
            Ok(paragraphs) => paragraphs,
            Err(fallback_err) => {
                return Err(AppError::ExtractionFailed(format!(
                    "DOCX parse failed (docx-rs: {primary_err}; xml fallback: {fallback_err})"
                )));
            }
        },
    };
    Ok(paragraphs.join("\n"))
}

fn paragraphs_with_docx_rs(bytes: &[u8]) -> AppResult<Vec<String>> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::ExtractionFailed(format!("docx-rs failed: {e}")))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(para) = child {
            let mut buf = String::new();
            push_paragraph_children(&para.children, &mut buf);
            paragraphs.push(buf);
        }
    }

    if paragraphs.is_empty() {
        return Err(AppError::ExtractionFailed(
            "DOCX contains no paragraphs (docx-rs path)".to_string(),
        ));
    }
    Ok(paragraphs)
}

/// Visible text of paragraph children. Hyperlinks, tracked insertions and
/// moved-in runs carry their own runs; deletions are skipped.
fn push_paragraph_children(children: &[docx_rs::ParagraphChild], buf: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run(run, buf),
            docx_rs::ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, buf),
            docx_rs::ParagraphChild::Insert(insert) => {
                for inserted in &insert.children {
                    if let docx_rs::InsertChild::Run(run) = inserted {
                        push_run(run, buf);
                    }
                }
            }
            docx_rs::ParagraphChild::MoveTo(moved) => {
                for moved_child in &moved.children {
                    if let docx_rs::MoveToChild::Run(run) = moved_child {
                        push_run(run, buf);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &docx_rs::Run, buf: &mut String) {
    for r in &run.children {
        match r {
            docx_rs::RunChild::Text(t) => buf.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => buf.push('\t'),
            docx_rs::RunChild::Break(_) => buf.push('\n'),
            _ => {}
        }
    }
}

fn paragraphs_with_xml_fallback(bytes: &[u8]) -> AppResult<Vec<String>> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| AppError::ExtractionFailed(format!("zip open failed: {e}")))?;
    let mut doc_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::ExtractionFailed(format!("word/document.xml missing: {e}")))?;
    let mut xml = String::new();
    doc_xml
        .read_to_string(&mut xml)
        .map_err(|e| AppError::ExtractionFailed(format!("cannot read document.xml: {e}")))?;

    let xml_doc = roxmltree::Document::parse(&xml)
        .map_err(|e| AppError::ExtractionFailed(format!("document.xml parse failed: {e}")))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for para in xml_doc.descendants().filter(is_body_paragraph) {
        let mut buf = String::new();
        for node in para.descendants().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "t" => {
                    if let Some(text) = node.text() {
                        buf.push_str(text);
                    }
                }
                "tab" => buf.push('\t'),
                "br" | "cr" => buf.push('\n'),
                _ => {}
            }
        }
        paragraphs.push(buf);
    }

    if paragraphs.is_empty() {
        return Err(AppError::ExtractionFailed(
            "DOCX contains no paragraphs (xml fallback path)".to_string(),
        ));
    }
    Ok(paragraphs)
}

/// Top-level `<w:p>` elements only; table-cell paragraphs are skipped, as in
/// the docx-rs path.
fn is_body_paragraph(node: &roxmltree::Node<'_, '_>) -> bool {
    node.is_element()
        && node.tag_name().name() == "p"
        && node
            .parent_element()
            .map(|parent| parent.tag_name().name() == "body")
            .unwrap_or(false)
}

// ── Plain text ────────────────────────────────────────────────────────────────

fn extract_txt(bytes: &[u8]) -> AppResult<String> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        AppError::ExtractionFailed(format!(
            "text is not valid UTF-8 (invalid byte at offset {})",
            e.valid_up_to()
        ))
    })?;
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_pages_still_contribute_a_line() {
        let joined = join_pages(&["Page one\n", "", "Page three"]);
        assert_eq!(joined, "Page one\n\nPage three\n");
        assert_eq!(joined.matches('\n').count(), 3);
    }

    #[test]
    fn txt_is_normalized() {
        let text = extract("\u{feff}  alpha\r\nbeta\r\n\n".as_bytes(), "txt").expect("txt");
        assert_eq!(text.as_str(), "alpha\nbeta");
    }

    #[test]
    fn invalid_utf8_fails_extraction() {
        let err = extract(&[0x66, 0x6f, 0xff, 0xfe], "txt").expect_err("invalid utf-8");
        assert_eq!(err.code(), "EXTRACTION_FAILED");
    }

    #[test]
    fn whitespace_only_text_is_empty_document() {
        let err = extract(b" \r\n\t\n", "txt").expect_err("empty");
        assert_eq!(err.code(), "EMPTY_DOCUMENT");
    }

    #[test]
    fn csv_is_unsupported() {
        let err = extract(b"a,b\n1,2", "csv").expect_err("unsupported");
        assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn garbage_pdf_fails_extraction() {
        let err = extract(b"definitely not a pdf", "pdf").expect_err("bad pdf");
        assert_eq!(err.code(), "EXTRACTION_FAILED");
    }

    #[test]
    fn garbage_docx_fails_extraction() {
        let err = extract(b"PK not really a zip", "docx").expect_err("bad docx");
        assert_eq!(err.code(), "EXTRACTION_FAILED");
    }
}
