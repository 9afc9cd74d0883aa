//! # mdpress-core
//!
//! Core conversion pipeline for mdpress: Markdown with embedded LaTeX in,
//! rendered HTML out.
//!
//! The pipeline has four stages:
//!
//! 1. [`math::protect`] extracts every math span and replaces it with an
//!    opaque placeholder so the Markdown parser cannot mangle it.
//! 2. pulldown-cmark parses the protected Markdown into an HTML fragment.
//! 3. [`math::resolve`] re-inserts rendered math at the placeholder
//!    locations and injects the semantic CSS classes.
//! 4. [`page::render_page`] wraps the fragment in a themed standalone
//!    document for the HTML and PDF exports.
//!
//! The DOCX exporter consumes the stage-3 fragment directly.

pub mod markdown;
pub mod math;
pub mod page;
pub mod slug;

pub use markdown::{Converted, MarkdownProcessor};
pub use math::{protect, resolve, EquationRecord, Equations, MathError, MathRenderer};
pub use math::typst::{TypstMathRenderer, MATH_RENDERER};
pub use page::render_page;
pub use slug::slugify;

use mdpress_types::ConvertOptions;

/// Errors surfaced by the HTML export surface.
///
/// Per-equation math failures never appear here; they degrade in-document.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to render document template: {0}")]
    Template(#[from] askama::Error),
}

/// Convert Markdown to the final HTML fragment (math rendered, classes
/// applied), without the standalone page chrome.
pub fn to_fragment(markdown: &str) -> Converted {
    MarkdownProcessor::new().convert(markdown, &*MATH_RENDERER)
}

/// Convert Markdown to a complete standalone HTML document.
pub fn to_html(markdown: &str, opts: &ConvertOptions) -> Result<String, ConvertError> {
    let converted = to_fragment(markdown);
    Ok(render_page(&converted, opts)?)
}
