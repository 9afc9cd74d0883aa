//! # mdpress-pdf
//!
//! PDF export boundary. The crate owns everything up to the print step:
//! it builds the complete themed HTML page (with `@page` A4 rules baked
//! into the stylesheet) and hands it to a [`PdfEngine`], the seam behind
//! which a headless-browser print service lives. The engine is a
//! collaborator supplied by the caller; this crate ships no browser.

use std::time::Duration;

use async_trait::async_trait;
use mdpress_types::ConvertOptions;

/// Knobs passed through to the print engine.
#[derive(Debug, Clone)]
pub struct PdfRenderOptions {
    /// Overall deadline for one render, enforced on this side of the seam.
    pub page_load_timeout: Duration,
    /// Budget for in-page scripts (font loading, layout settling).
    pub script_timeout: Duration,
    /// Ask the engine to stamp page numbers in the footer.
    pub page_numbers: bool,
}

impl Default for PdfRenderOptions {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(30),
            script_timeout: Duration::from_secs(10),
            page_numbers: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("pdf engine failed: {0}")]
    Engine(String),
    #[error("pdf rendering timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Convert(#[from] mdpress_core::ConvertError),
}

/// The print seam. Implementations receive a self-contained HTML document
/// and return PDF bytes.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn render(&self, html: &str, opts: &PdfRenderOptions) -> Result<Vec<u8>, PdfError>;
}

/// Convert Markdown to PDF bytes through the given engine, with default
/// render options derived from `opts`.
pub async fn to_pdf(
    markdown: &str,
    opts: &ConvertOptions,
    engine: &dyn PdfEngine,
) -> Result<Vec<u8>, PdfError> {
    let render_opts = PdfRenderOptions {
        page_numbers: opts.page_numbers,
        ..Default::default()
    };
    to_pdf_with(markdown, opts, engine, &render_opts).await
}

/// As [`to_pdf`], with explicit render options.
pub async fn to_pdf_with(
    markdown: &str,
    opts: &ConvertOptions,
    engine: &dyn PdfEngine,
    render_opts: &PdfRenderOptions,
) -> Result<Vec<u8>, PdfError> {
    let html = mdpress_core::to_html(markdown, opts)?;
    tracing::debug!(bytes = html.len(), "handing page to pdf engine");

    match tokio::time::timeout(render_opts.page_load_timeout, engine.render(&html, render_opts))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(PdfError::Timeout(render_opts.page_load_timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Captures the page it was handed and returns a fixed PDF header.
    struct CapturingEngine {
        seen: Mutex<Option<String>>,
    }

    #[async_trait]
    impl PdfEngine for CapturingEngine {
        async fn render(&self, html: &str, _opts: &PdfRenderOptions) -> Result<Vec<u8>, PdfError> {
            *self.seen.lock().unwrap() = Some(html.to_string());
            Ok(b"%PDF-1.7 fake".to_vec())
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl PdfEngine for FailingEngine {
        async fn render(&self, _html: &str, _opts: &PdfRenderOptions) -> Result<Vec<u8>, PdfError> {
            Err(PdfError::Engine("browser crashed".to_string()))
        }
    }

    struct SleepingEngine;

    #[async_trait]
    impl PdfEngine for SleepingEngine {
        async fn render(&self, _html: &str, _opts: &PdfRenderOptions) -> Result<Vec<u8>, PdfError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn engine_receives_the_complete_themed_page() {
        let engine = CapturingEngine {
            seen: Mutex::new(None),
        };
        let opts = ConvertOptions {
            title: "Paper".to_string(),
            ..Default::default()
        };
        let pdf = to_pdf("# Hello", &opts, &engine).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let html = engine.seen.lock().unwrap().take().unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Paper</title>"));
        assert!(html.contains("@page"));
        assert!(html.contains("<h1"));
    }

    #[tokio::test]
    async fn engine_failure_propagates() {
        let err = to_pdf("x", &ConvertOptions::default(), &FailingEngine)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::Engine(_)));
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let render_opts = PdfRenderOptions {
            page_load_timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let err = to_pdf_with("x", &ConvertOptions::default(), &SleepingEngine, &render_opts)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::Timeout(_)));
    }
}
