//! PDF loader built on lopdf.

use super::{normalize_text, DocumentLoader};
use crate::chunking::{create_chunker, Chunk, Chunker, ChunkingConfig, ChunkingStrategy, Page};
use crate::error::{PdfQaError, Result};
use lopdf::Document as PdfDocument;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Loads a PDF from disk and chunks its pages.
pub struct PdfLoader {
    chunker: Box<dyn Chunker>,
}

impl PdfLoader {
    /// Create a loader with the given chunking strategy.
    pub fn new(strategy: ChunkingStrategy, config: ChunkingConfig) -> Self {
        Self {
            chunker: create_chunker(strategy, config),
        }
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new(ChunkingStrategy::default(), ChunkingConfig::default())
    }
}

impl DocumentLoader for PdfLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<Vec<Chunk>> {
        let pages = extract_pages(path)?;

        if pages.iter().all(|p| p.text.is_empty()) {
            return Err(PdfQaError::Parse(format!(
                "{} contains no extractable text",
                path.display()
            )));
        }

        let chunks = self.chunker.chunk(&pages);
        info!("Split {} pages into {} chunks", pages.len(), chunks.len());
        Ok(chunks)
    }
}

/// Read a PDF and extract the normalised text of every page, in page order.
pub fn extract_pages(path: &Path) -> Result<Vec<Page>> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PdfQaError::NotFound(path.display().to_string()),
        _ => PdfQaError::Io(e),
    })?;

    let document = PdfDocument::load_mem(&bytes).map_err(|e| {
        if declares_encryption(&bytes) {
            PdfQaError::Parse(format!("{} is encrypted: {}", path.display(), e))
        } else {
            PdfQaError::Parse(format!("{}: {}", path.display(), e))
        }
    })?;

    if document.is_encrypted() || document.trailer.has(b"Encrypt") {
        return Err(PdfQaError::Parse(format!(
            "{} is encrypted",
            path.display()
        )));
    }

    // BTreeMap keeps page numbers sorted
    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    debug!("PDF has {} pages", page_numbers.len());

    let pages = page_numbers
        .into_iter()
        .map(|number| {
            let text = match document.extract_text(&[number]) {
                Ok(text) => normalize_text(&text),
                Err(e) => {
                    warn!("Could not extract text from page {}: {}", number, e);
                    String::new()
                }
            };
            Page::new(number, text)
        })
        .collect();

    Ok(pages)
}

/// Whether the raw file names an `/Encrypt` dictionary.
fn declares_encryption(bytes: &[u8]) -> bool {
    bytes.windows(8).any(|w| w == b"/Encrypt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::io::Write;

    /// Build a PDF with one Courier text line per page.
    fn build_pdf(page_texts: &[&str]) -> PdfDocument {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn write_pdf(path: &Path, page_texts: &[&str]) {
        build_pdf(page_texts).save(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfLoader::default()
            .load(&dir.path().join("missing.pdf"))
            .unwrap_err();
        assert!(matches!(err, PdfQaError::NotFound(_)));
    }

    #[test]
    fn test_non_pdf_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is just plain text, not a PDF").unwrap();

        let err = PdfLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, PdfQaError::Parse(_)));
    }

    #[test]
    fn test_loads_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, &["The sky is blue.", "Water boils at 100C."]);

        let pages = extract_pages(&path).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert!(pages[0].text.contains("sky is blue"));
        assert!(pages[1].text.contains("Water boils"));

        let chunks = PdfLoader::new(ChunkingStrategy::Page, ChunkingConfig::default())
            .load(&path)
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].source().page, 2);
    }

    #[test]
    fn test_pdf_without_text_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        write_pdf(&path, &[""]);

        let err = PdfLoader::default().load(&path).unwrap_err();
        assert!(matches!(err, PdfQaError::Parse(msg) if msg.contains("no extractable text")));
    }

    #[test]
    fn test_encrypted_pdf_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        let mut doc = build_pdf(&["Top secret."]);
        doc.trailer.set(
            "Encrypt",
            dictionary! {
                "Filter" => "Standard",
                "V" => 99,
                "R" => 99,
                "Length" => 128,
                "P" => -1,
                "O" => Object::string_literal(vec![0u8; 32]),
                "U" => Object::string_literal(vec![0u8; 32]),
            },
        );
        doc.save(&path).unwrap();

        let err = PdfLoader::default().load(&path).unwrap_err();
        assert!(matches!(err, PdfQaError::Parse(msg) if msg.contains("encrypted")));
    }

    #[test]
    fn test_encryption_marker_detection() {
        assert!(declares_encryption(b"trailer << /Root 1 0 R /Encrypt 5 0 R >>"));
        assert!(!declares_encryption(b"trailer << /Root 1 0 R >>"));
    }
}
