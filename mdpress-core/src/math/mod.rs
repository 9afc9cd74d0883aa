//! Math span protection, rendering, and placeholder resolution.

pub mod extract;
pub mod resolve;
pub mod typst;

pub use extract::{protect, EquationRecord, Equations};
pub use resolve::resolve;

/// A LaTeX-to-presentation renderer.
///
/// Implementations convert one equation body to rendered markup. Failure is
/// always per-equation: callers recover locally and never abort the whole
/// conversion over a single bad equation.
pub trait MathRenderer: Send + Sync {
    /// Render for embedding into the HTML output.
    fn render_html(&self, latex: &str, display: bool) -> Result<String, MathError>;

    /// Render as a standalone SVG document (used by the DOCX projector,
    /// which needs a `width`/`height` declaration it can measure).
    fn render_svg(&self, latex: &str, display: bool) -> Result<String, MathError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MathError {
    #[error("LaTeX conversion failed: {0}")]
    Latex(String),

    #[error("math compilation failed: {0}")]
    Compile(String),
}

/// Escape text for HTML body and attribute positions.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
