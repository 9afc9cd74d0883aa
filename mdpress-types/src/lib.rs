//! Shared types for mdpress
//!
//! This crate provides the common leaf types used across the mdpress
//! ecosystem: export themes, the per-conversion options bag, and small
//! helpers shared by every output format.

use serde::{Deserialize, Serialize};

/// Input size ceiling enforced at the export boundary (not in the core
/// pipeline). Requests larger than this are rejected with a client error
/// before any parsing happens.
pub const MAX_INPUT_BYTES: usize = 1_000_000;

/// Export color theme.
///
/// A theme is a pure mapping to color palettes; it carries no state of its
/// own. Both the CSS palette (HTML/PDF path) and the OOXML palette (DOCX
/// path) are total functions of the theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Color,
    BlackAndWhite,
}

/// CSS colors for the HTML and PDF outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CssPalette {
    pub background: &'static str,
    pub text: &'static str,
    pub heading: &'static str,
    pub accent: &'static str,
    pub code_bg: &'static str,
    pub code_text: &'static str,
    pub table_bg: &'static str,
    pub table_header: &'static str,
    pub border: &'static str,
}

/// OOXML hex colors (no leading `#`) for the DOCX style sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocxPalette {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub heading1: &'static str,
    pub heading2: &'static str,
    pub heading3: &'static str,
    pub heading4: &'static str,
    pub normal: &'static str,
    pub quote: &'static str,
    pub code_bg: &'static str,
    pub code_text: &'static str,
    pub link: &'static str,
    pub table_header_bg: &'static str,
}

impl Theme {
    pub fn css(&self) -> CssPalette {
        match self {
            Theme::Color => CssPalette {
                background: "#0f172a",
                text: "#e2e8f0",
                heading: "#66e4ff",
                accent: "#d946ef",
                code_bg: "rgba(255, 255, 255, 0.05)",
                code_text: "#e2e8f0",
                table_bg: "rgba(255, 255, 255, 0.02)",
                table_header: "rgba(102, 228, 255, 0.1)",
                border: "rgba(255, 255, 255, 0.1)",
            },
            Theme::BlackAndWhite => CssPalette {
                background: "#ffffff",
                text: "#000000",
                heading: "#1a1a1a",
                accent: "#1a1a1a",
                code_bg: "#f5f5f5",
                code_text: "#000000",
                table_bg: "#ffffff",
                table_header: "#f0f0f0",
                border: "#cccccc",
            },
        }
    }

    pub fn docx(&self) -> DocxPalette {
        match self {
            Theme::Color => DocxPalette {
                title: "2E74B5",
                subtitle: "595959",
                heading1: "2E74B5",
                heading2: "2E74B5",
                heading3: "1F4D78",
                heading4: "2E74B5",
                normal: "000000",
                quote: "595959",
                code_bg: "F2F2F2",
                code_text: "000000",
                link: "0563C1",
                table_header_bg: "F0F0F0",
            },
            Theme::BlackAndWhite => DocxPalette {
                title: "000000",
                subtitle: "000000",
                heading1: "000000",
                heading2: "000000",
                heading3: "000000",
                heading4: "000000",
                normal: "000000",
                quote: "404040",
                code_bg: "F5F5F5",
                code_text: "000000",
                link: "000000",
                table_header_bg: "F0F0F0",
            },
        }
    }
}

/// Options bag accepted by every export operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    pub title: String,
    pub author: String,
    pub date: String,
    pub theme: Theme,
    pub include_table_of_contents: bool,
    pub include_styles: bool,
    pub page_numbers: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            title: "Document".to_string(),
            author: String::new(),
            date: String::new(),
            theme: Theme::default(),
            include_table_of_contents: false,
            include_styles: true,
            page_numbers: false,
        }
    }
}

/// Derive a safe download filename from a document title.
///
/// Every non-alphanumeric character is replaced with an underscore, matching
/// the content-disposition contract of the export surface.
pub fn sanitize_filename(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() {
        "document".to_string()
    } else {
        name
    }
}
