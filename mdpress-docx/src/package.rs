//! OPC package assembly: zip the projected document and its fixed parts
//! into a .docx byte buffer.

use std::io::{Cursor, Write};

use mdpress_types::ConvertOptions;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::project::{MediaBlob, FIXED_RELATIONSHIP_COUNT};
use crate::styles::{font_table_xml, settings_xml, styles_xml};
use crate::xml::escape_xml;
use crate::DocxError;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Zip entry compression for the package.
///
/// `Store` is the default: some strict OOXML consumers reject deflated
/// `[Content_Types].xml` entries, and the size cost on these small
/// documents is negligible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    Store,
    Deflate,
}

/// Assemble a complete .docx package from a projected document.
///
/// Parts are written in a fixed order with fixed relationship IDs:
/// `rId1` styles, `rId2` fontTable, `rId3` settings, then one image
/// relationship per media blob (`rId{3+i}` -> `media/math{i}.svg`).
pub fn assemble(
    document_xml: &str,
    opts: &ConvertOptions,
    media: &[MediaBlob],
    compression: Compression,
) -> Result<Vec<u8>, DocxError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default().compression_method(match compression {
        Compression::Store => CompressionMethod::Stored,
        Compression::Deflate => CompressionMethod::Deflated,
    });

    let mut part = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, content: &str| {
        zip.start_file(name, file_options)?;
        zip.write_all(content.as_bytes())?;
        Ok::<_, DocxError>(())
    };

    part(&mut zip, "[Content_Types].xml", &content_types(!media.is_empty()))?;
    part(&mut zip, "_rels/.rels", &package_rels())?;
    part(&mut zip, "docProps/core.xml", &core_props(opts))?;
    part(&mut zip, "docProps/app.xml", &app_props())?;
    part(&mut zip, "word/_rels/document.xml.rels", &document_rels(media))?;
    part(&mut zip, "word/document.xml", document_xml)?;
    part(&mut zip, "word/styles.xml", &styles_xml(opts.theme))?;
    part(&mut zip, "word/fontTable.xml", &font_table_xml())?;
    part(&mut zip, "word/settings.xml", &settings_xml())?;
    for blob in media {
        part(
            &mut zip,
            &format!("word/media/math{}.svg", blob.index),
            &blob.svg,
        )?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn content_types(has_media: bool) -> String {
    let svg_default = if has_media {
        r#"<Default Extension="svg" ContentType="image/svg+xml"/>"#
    } else {
        ""
    };
    format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{svg_default}<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/fontTable.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.fontTable+xml"/><Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#
    )
}

fn package_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn document_rels(media: &[MediaBlob]) -> String {
    let mut out = format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/fontTable" Target="fontTable.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>"#
    );
    for blob in media {
        out.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/math{}.svg"/>"#,
            FIXED_RELATIONSHIP_COUNT + blob.index,
            blob.index
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn core_props(opts: &ConvertOptions) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>{author}</dc:creator><cp:lastModifiedBy>{author}</cp:lastModifiedBy><dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified></cp:coreProperties>"#,
        title = escape_xml(&opts.title),
        author = escape_xml(&opts.author),
    )
}

fn app_props() -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>mdpress</Application></Properties>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    fn doc_xml() -> String {
        r#"<?xml version="1.0"?><w:document><w:body><w:p/></w:body></w:document>"#.to_string()
    }

    #[test]
    fn package_contains_all_fixed_parts() {
        let bytes = assemble(&doc_xml(), &ConvertOptions::default(), &[], Compression::Store)
            .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "word/_rels/document.xml.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/fontTable.xml",
            "word/settings.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {name}");
        }
    }

    #[test]
    fn svg_content_type_only_with_media() {
        let without = assemble(&doc_xml(), &ConvertOptions::default(), &[], Compression::Store)
            .unwrap();
        assert!(!read_part(&without, "[Content_Types].xml").contains("svg"));

        let media = vec![MediaBlob {
            index: 1,
            svg: "<svg/>".to_string(),
        }];
        let with = assemble(&doc_xml(), &ConvertOptions::default(), &media, Compression::Store)
            .unwrap();
        assert!(read_part(&with, "[Content_Types].xml").contains("image/svg+xml"));
    }

    #[test]
    fn media_parts_and_relationships_line_up() {
        let media = vec![
            MediaBlob {
                index: 1,
                svg: "<svg>a</svg>".to_string(),
            },
            MediaBlob {
                index: 2,
                svg: "<svg>b</svg>".to_string(),
            },
        ];
        let bytes = assemble(&doc_xml(), &ConvertOptions::default(), &media, Compression::Store)
            .unwrap();

        let rels = read_part(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/math1.svg""#));
        assert!(rels.contains(r#"Id="rId5""#));
        assert_eq!(read_part(&bytes, "word/media/math1.svg"), "<svg>a</svg>");
        assert_eq!(read_part(&bytes, "word/media/math2.svg"), "<svg>b</svg>");
    }

    #[test]
    fn core_props_carry_escaped_title() {
        let opts = ConvertOptions {
            title: "Q&A".to_string(),
            author: "Ada".to_string(),
            ..Default::default()
        };
        let bytes = assemble(&doc_xml(), &opts, &[], Compression::Store).unwrap();
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Q&amp;A</dc:title>"));
        assert!(core.contains("<dc:creator>Ada</dc:creator>"));
    }

    #[test]
    fn deflate_round_trips() {
        let bytes = assemble(&doc_xml(), &ConvertOptions::default(), &[], Compression::Deflate)
            .unwrap();
        assert!(read_part(&bytes, "word/document.xml").contains("<w:body>"));
    }
}
