//! Placeholder resolution: re-insert rendered math into the parsed HTML
//! and inject the semantic classes used by the styling layers.

use super::extract::{display_placeholder, inline_placeholder, Equations};
use super::{escape_html, MathRenderer};

/// Replace every math placeholder in `html` with rendered markup.
///
/// Display placeholders are looked up under two patterns, in order: the
/// paragraph-wrapped form `<p>%%%DISPLAY_MATH_i%%%</p>` (the common case)
/// and the bare token (list items, table cells). All occurrences of both
/// patterns are replaced, not just the first.
///
/// A render failure substitutes a visible error fragment carrying the
/// escaped LaTeX source; it never fails the conversion. Successful renders
/// are wrapped in a container holding the original LaTeX in a `data-tex`
/// attribute plus a hidden `math-src` annotation span, both of which the
/// DOCX projector reads back.
pub fn resolve(html: &str, equations: &Equations, renderer: &dyn MathRenderer) -> String {
    let mut html = html.to_string();

    for eq in &equations.display {
        let token = display_placeholder(eq.index);
        let patterns = [format!("<p>{token}</p>"), token];
        let tex = escape_html(&eq.latex);

        let replacement = match renderer.render_html(&eq.latex, true) {
            Ok(rendered) => format!(
                r#"<div class="math-display" data-tex="{tex}">{rendered}<span class="math-src" hidden>{tex}</span></div>"#
            ),
            Err(err) => {
                tracing::warn!("display math {} failed: {err}", eq.index);
                format!(r#"<div class="math-error">LaTeX error: {tex}</div>"#)
            }
        };

        for pattern in &patterns {
            html = html.replace(pattern.as_str(), &replacement);
        }
    }

    for eq in &equations.inline {
        let token = inline_placeholder(eq.index);
        let tex = escape_html(&eq.latex);

        let replacement = match renderer.render_html(&eq.latex, false) {
            Ok(rendered) => format!(
                r#"<span class="math-inline" data-tex="{tex}">{rendered}<span class="math-src" hidden>{tex}</span></span>"#
            ),
            Err(err) => {
                tracing::warn!("inline math {} failed: {err}", eq.index);
                format!(r#"<span class="math-error">${tex}$</span>"#)
            }
        };

        html = html.replace(token.as_str(), &replacement);
    }

    inject_classes(&html)
}

/// Fixed classname injections applied after math resolution. Tag names are
/// disjoint, so the order of the rewrites does not matter.
fn inject_classes(html: &str) -> String {
    html.replace("<table>", r#"<table class="md-table">"#)
        .replace("<blockquote>", r#"<blockquote class="md-quote">"#)
}

#[cfg(test)]
mod tests {
    use super::super::{protect, MathError};
    use super::*;

    /// Echoes the equation body back; lets tests assert exact round-trips.
    struct EchoRenderer;

    impl MathRenderer for EchoRenderer {
        fn render_html(&self, latex: &str, _display: bool) -> Result<String, MathError> {
            Ok(latex.to_string())
        }

        fn render_svg(&self, latex: &str, _display: bool) -> Result<String, MathError> {
            Ok(latex.to_string())
        }
    }

    struct FailingRenderer;

    impl MathRenderer for FailingRenderer {
        fn render_html(&self, _latex: &str, _display: bool) -> Result<String, MathError> {
            Err(MathError::Compile("boom".to_string()))
        }

        fn render_svg(&self, _latex: &str, _display: bool) -> Result<String, MathError> {
            Err(MathError::Compile("boom".to_string()))
        }
    }

    #[test]
    fn no_placeholder_survives_resolution() {
        let (_, eqs) = protect("$a+b$ and $$c$$ and $d$");
        let html = "<p>%%%INLINE_MATH_0%%%</p><p>%%%DISPLAY_MATH_0%%%</p><p>%%%INLINE_MATH_1%%%</p>";
        let out = resolve(html, &eqs, &EchoRenderer);
        assert!(!out.contains("%%%"), "placeholders survived: {out}");
    }

    #[test]
    fn display_math_unwraps_paragraph() {
        let (_, eqs) = protect("$$x$$");
        let out = resolve("<p>%%%DISPLAY_MATH_0%%%</p>", &eqs, &EchoRenderer);
        assert!(out.starts_with(r#"<div class="math-display""#));
        assert!(!out.contains("<p>"));
    }

    #[test]
    fn bare_display_placeholder_is_replaced() {
        let (_, eqs) = protect("$$x$$");
        let out = resolve("<li>%%%DISPLAY_MATH_0%%%</li>", &eqs, &EchoRenderer);
        assert!(out.contains(r#"<div class="math-display""#));
        assert!(!out.contains("%%%"));
    }

    #[test]
    fn round_trip_preserves_equation_body() {
        let (_, eqs) = protect("Energy: $E = mc^2$");
        let out = resolve("<p>%%%INLINE_MATH_0%%%</p>", &eqs, &EchoRenderer);
        assert!(out.contains("E = mc^2"));
        assert!(out.contains(r#"data-tex="E = mc^2""#));
    }

    #[test]
    fn render_failure_degrades_locally() {
        let (_, eqs) = protect("$\\bad{$ and $ok$");
        let html = "<p>%%%INLINE_MATH_0%%% %%%INLINE_MATH_1%%%</p>";
        let out = resolve(html, &eqs, &FailingRenderer);
        // Both degrade to error fragments, the conversion itself survives.
        assert!(!out.contains("%%%"));
        assert_eq!(out.matches("math-error").count(), 2);
    }

    #[test]
    fn repeated_placeholders_are_all_replaced() {
        let (_, eqs) = protect("$x$");
        let html = "<p>%%%INLINE_MATH_0%%%</p><p>%%%INLINE_MATH_0%%%</p>";
        let out = resolve(html, &eqs, &EchoRenderer);
        assert!(!out.contains("%%%"));
        assert_eq!(out.matches("math-inline").count(), 2);
    }

    #[test]
    fn injects_table_and_quote_classes() {
        let (_, eqs) = protect("");
        let out = resolve("<table><tr></tr></table><blockquote>q</blockquote>", &eqs, &EchoRenderer);
        assert!(out.contains(r#"<table class="md-table">"#));
        assert!(out.contains(r#"<blockquote class="md-quote">"#));
    }
}
