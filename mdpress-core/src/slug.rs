//! Heading slug generation for TOC anchors.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid hyphen regex"));

/// Convert a heading title to a URL-safe anchor id: lowercase, whitespace
/// to hyphens, punctuation dropped, hyphen runs collapsed.
pub fn slugify(input: &str) -> String {
    let cleaned: String = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' {
                Some("-")
            } else if c.is_ascii_alphanumeric() || c.is_alphabetic() || c == '-' {
                Some(g)
            } else {
                None
            }
        })
        .collect();

    HYPHEN_RUNS
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_titles() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Results & Discussion"), "results-discussion");
    }

    #[test]
    fn collapses_and_trims_hyphens() {
        assert_eq!(slugify("  a  --  b  "), "a-b");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(slugify("Café notes"), "café-notes");
    }
}
