//! Math extraction: normalize delimiter dialects and protect equation
//! bodies from the Markdown parser with opaque placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// One extracted equation. `index` is the occurrence order within its class
/// (display vs inline); it is also the placeholder ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationRecord {
    pub index: usize,
    pub latex: String,
    pub display: bool,
}

/// All equations extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Equations {
    pub display: Vec<EquationRecord>,
    pub inline: Vec<EquationRecord>,
}

impl Equations {
    pub fn is_empty(&self) -> bool {
        self.display.is_empty() && self.inline.is_empty()
    }

    /// Replace placeholder tokens in `text` with their original LaTeX
    /// bodies. For plain-text contexts (TOC titles, slugs) that must never
    /// carry a raw token.
    pub fn restore_text(&self, text: &str) -> String {
        let mut out = text.to_string();
        for eq in &self.display {
            out = out.replace(&display_placeholder(eq.index), &eq.latex);
        }
        for eq in &self.inline {
            out = out.replace(&inline_placeholder(eq.index), &eq.latex);
        }
        out
    }
}

static BRACKET_DISPLAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\\[(.*?)\\\]").expect("valid \\[..\\] regex"));

static PAREN_INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\((.*?)\\\)").expect("valid \\(..\\) regex"));

// Chat assistants often paste math as `( \frac{a}{b} )`. Require at least
// one leading backslash command so ordinary parenthetical prose never
// matches.
static CHAT_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s+(\\[a-zA-Z]+[^)]*?)\s+\)").expect("valid chat paren regex"));

static DISPLAY_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").expect("valid display math regex"));

// Single-line only: a `$` pair must not cross a newline, so currency and
// emphasis text on other lines is never swallowed.
static INLINE_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([^\$\n]+?)\$").expect("valid inline math regex"));

/// Placeholder token for a display equation.
pub fn display_placeholder(index: usize) -> String {
    format!("%%%DISPLAY_MATH_{index}%%%")
}

/// Placeholder token for an inline equation.
pub fn inline_placeholder(index: usize) -> String {
    format!("%%%INLINE_MATH_{index}%%%")
}

/// Extract all math spans from `markdown`, replacing each with a
/// parser-opaque placeholder.
///
/// Normalization passes run in strict order before extraction so later
/// passes never re-match content an earlier pass already produced:
/// `\[..\]` becomes `$$..$$`, `\(..\)` becomes `$..$`, the chat-paste
/// `( \cmd .. )` form becomes `$..$`, then display spans are extracted
/// (multi-line, non-greedy) followed by inline spans (single-line only).
///
/// A `$` with no closing `$` on the same line passes through untouched.
pub fn protect(markdown: &str) -> (String, Equations) {
    let md = BRACKET_DISPLAY.replace_all(markdown, |c: &Captures| format!("$${}$$", &c[1]));
    let md = PAREN_INLINE.replace_all(&md, |c: &Captures| format!("${}$", &c[1]));
    let md = CHAT_PAREN.replace_all(&md, |c: &Captures| format!("${}$", c[1].trim()));

    let mut equations = Equations::default();

    // Display first; the surrounding newlines make the parser treat the
    // placeholder as its own block.
    let md = DISPLAY_MATH.replace_all(&md, |c: &Captures| {
        let index = equations.display.len();
        equations.display.push(EquationRecord {
            index,
            latex: c[1].trim().to_string(),
            display: true,
        });
        format!("\n{}\n", display_placeholder(index))
    });

    let md = INLINE_MATH.replace_all(&md, |c: &Captures| {
        let index = equations.inline.len();
        equations.inline.push(EquationRecord {
            index,
            latex: c[1].trim().to_string(),
            display: false,
        });
        inline_placeholder(index)
    });

    (md.into_owned(), equations)
}
