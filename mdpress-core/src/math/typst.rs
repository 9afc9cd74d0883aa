//! Typst-backed math rendering to SVG.
//!
//! LaTeX equation bodies are translated to Typst math with mitex, compiled
//! on a width/height-auto page, and exported with typst-svg. The resulting
//! SVG carries `width="..pt"`/`height="..pt"` declarations the DOCX
//! projector measures for physical sizing.

use std::{
    hash::{Hash, Hasher},
    num::NonZeroUsize,
    sync::Mutex,
};

use lru::LruCache;
use once_cell::sync::Lazy;
use tracing::warn;
use typst::diag::SourceDiagnostic;
use typst::layout::{Abs, PagedDocument};
use typst_as_lib::TypstEngine;

use super::{MathError, MathRenderer};

const MATH_CACHE_CAPACITY: usize = 512;

/// Renders LaTeX math through mitex and Typst.
#[derive(Debug)]
pub struct TypstMathRenderer {
    fonts: Vec<&'static [u8]>,
    cache: Mutex<LruCache<String, String>>,
}

impl TypstMathRenderer {
    pub fn new() -> Self {
        Self {
            fonts: typst_assets::fonts().collect(),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(MATH_CACHE_CAPACITY).expect("nonzero cache capacity"),
            )),
        }
    }

    fn compile_svg(&self, latex: &str, display: bool) -> Result<String, MathError> {
        let key = cache_key(latex, display);
        {
            let mut cache = self.cache.lock().expect("math cache lock");
            if let Some(svg) = cache.get(&key) {
                return Ok(svg.clone());
            }
        }

        let math = mitex::convert_math(latex, None).map_err(MathError::Latex)?;
        let source = build_source(&math, display);

        let engine = TypstEngine::builder()
            .main_file(source)
            .fonts(self.fonts.iter().copied())
            .build();

        let warned = engine.compile::<PagedDocument>();
        log_warnings(&warned.warnings);
        let doc = warned
            .output
            .map_err(|err| MathError::Compile(err.to_string()))?;

        // Minimal padding so strokes aren't clipped at the page edge.
        let svg = typst_svg::svg_merged(&doc, Abs::pt(0.5));

        self.cache
            .lock()
            .expect("math cache lock")
            .put(key, svg.clone());

        Ok(svg)
    }
}

impl Default for TypstMathRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MathRenderer for TypstMathRenderer {
    fn render_html(&self, latex: &str, display: bool) -> Result<String, MathError> {
        self.compile_svg(latex, display)
    }

    fn render_svg(&self, latex: &str, display: bool) -> Result<String, MathError> {
        self.compile_svg(latex, display)
    }
}

fn build_source(math: &str, display: bool) -> String {
    // In Typst, spaces inside the `$` pair select display layout.
    let body = if display {
        format!("$ {math} $")
    } else {
        format!("${math}$")
    };
    format!(
        r#"
#set page(width: auto, height: auto, margin: 0pt, fill: none)
#set text(font: "New Computer Modern", size: 12pt, fill: black)
#set math.equation(numbering: none)

{body}
"#
    )
}

fn cache_key(latex: &str, display: bool) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    latex.hash(&mut hasher);
    display.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn log_warnings(warnings: &[SourceDiagnostic]) {
    for warning in warnings {
        warn!("Typst warning: {warning:?}");
    }
}

/// Shared renderer for callers that want a singleton. The font set and the
/// render cache are the only shared state; per-document numbering never
/// lives here.
pub static MATH_RENDERER: Lazy<TypstMathRenderer> = Lazy::new(TypstMathRenderer::new);
