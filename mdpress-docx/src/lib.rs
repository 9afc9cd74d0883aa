//! # mdpress-docx
//!
//! DOCX export for mdpress. The exporter reuses the core HTML pipeline:
//! Markdown is converted to the resolved HTML fragment, the fragment is
//! projected to WordprocessingML ([`project`]), and the projection is
//! zipped into an OPC package ([`package::assemble`]).
//!
//! Equations are rendered to SVG and embedded as inline drawings sized in
//! EMUs from the SVG's point dimensions. A failed equation degrades to its
//! bracketed LaTeX source; the export itself only fails on packaging I/O.

pub mod package;
pub mod project;
mod styles;
mod xml;

pub use package::{assemble, Compression};
pub use project::{project, MediaBlob, Projection, FIXED_RELATIONSHIP_COUNT};

use mdpress_types::ConvertOptions;

#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    #[error("failed to write docx package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to write docx part: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert Markdown to a complete .docx byte buffer with stored entries.
pub fn to_docx(markdown: &str, opts: &ConvertOptions) -> Result<Vec<u8>, DocxError> {
    to_docx_with(markdown, opts, Compression::Store)
}

/// As [`to_docx`], with an explicit package compression choice.
pub fn to_docx_with(
    markdown: &str,
    opts: &ConvertOptions,
    compression: Compression,
) -> Result<Vec<u8>, DocxError> {
    let converted = mdpress_core::to_fragment(markdown);
    let projection = project(&converted.html, opts, &*mdpress_core::MATH_RENDERER);
    assemble(
        &projection.document_xml,
        opts,
        &projection.media,
        compression,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn document_xml(bytes: Vec<u8>) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn to_docx_covers_the_whole_pipeline() {
        let bytes = to_docx("# Title\n\nbody text", &ConvertOptions::default()).unwrap();
        let doc = document_xml(bytes);
        assert!(doc.contains(r#"w:val="Heading1""#));
        assert!(doc.contains(">body text</w:t>"));
    }

    #[test]
    fn deflated_package_is_still_readable() {
        let bytes =
            to_docx_with("plain", &ConvertOptions::default(), Compression::Deflate).unwrap();
        assert!(document_xml(bytes).contains(">plain</w:t>"));
    }
}
