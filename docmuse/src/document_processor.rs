use lopdf::{Document, Object};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

use crate::error::{DocmuseError, Result};

const TITLE_MAX_GRAPHEMES: usize = 50;
const UNTITLED: &str = "Untitled PDF";

/// Plain text pulled out of a PDF, plus the embedded title when the
/// document information dictionary carries one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub text: String,
    pub title: Option<String>,
}

/// Converts a byte buffer presumed to be a PDF into an [`ExtractedDocument`].
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument>;
}

/// Production extractor: `pdf-extract` for the text, `lopdf` for the
/// information dictionary.
#[derive(Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocmuseError::Extraction(e.to_string()))?;
        // Title metadata is best-effort; a document without an Info
        // dictionary is still a valid extraction.
        let title = metadata_title(bytes);
        Ok(ExtractedDocument { text, title })
    }
}

/// Reads the `Title` entry of the PDF information dictionary, if any.
fn metadata_title(bytes: &[u8]) -> Option<String> {
    let document = Document::load_mem(bytes).ok()?;
    let info = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?,
        object => object,
    };
    match info.as_dict().ok()?.get(b"Title").ok()? {
        Object::String(raw, _) => decode_pdf_string(raw),
        _ => None,
    }
}

/// PDF text strings are either UTF-16BE with a BOM or a Latin-1-ish
/// single-byte encoding.
fn decode_pdf_string(raw: &[u8]) -> Option<String> {
    let decoded = if raw.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = raw[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        raw.iter().map(|&b| b as char).collect()
    };
    let decoded = decoded.trim().to_string();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

/// Picks a display title for a document: embedded metadata first, then the
/// first line of the extracted text (truncated), then the URL's file name.
pub fn derive_title(document: &ExtractedDocument, url: &str) -> String {
    if let Some(title) = document.title.as_deref() {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }
    if let Some(line) = first_line(&document.text) {
        return truncate_title(&line);
    }
    filename_segment(url).unwrap_or_else(|| UNTITLED.to_string())
}

fn first_line(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    let collapsed = Regex::new(r"\s+").unwrap().replace_all(line, " ");
    Some(collapsed.into_owned())
}

fn truncate_title(line: &str) -> String {
    let graphemes: Vec<&str> = line.graphemes(true).collect();
    if graphemes.len() > TITLE_MAX_GRAPHEMES {
        let mut title = graphemes[..TITLE_MAX_GRAPHEMES].concat();
        title.push_str("...");
        title
    } else {
        line.to_string()
    }
}

fn filename_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;
    Some(segment.to_string())
}
