//! Markdown processing pipeline.
//!
//! The parser itself is pulldown-cmark; math never reaches it. All math
//! delimiters are stripped by [`crate::math::protect`] beforehand and
//! re-inserted by [`crate::math::resolve`] afterwards.

use crate::math::{escape_html, protect, resolve, Equations, MathRenderer};
use crate::slug::slugify;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Result of one fragment conversion.
#[derive(Debug, Clone)]
pub struct Converted {
    /// Final HTML fragment: math rendered, semantic classes applied.
    pub html: String,
    /// Rendered table-of-contents nav, if the document has headings.
    pub toc: Option<String>,
}

#[derive(Debug, Clone)]
struct TocItem {
    level: u32,
    title: String,
    id: String,
}

/// Markdown processor with the math protection pipeline attached.
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        // ENABLE_MATH stays off: the protector handles $, $$, \[..\] and
        // \(..\) itself, including the chat-paste dialects.

        Self { options }
    }

    /// Convert Markdown to the final HTML fragment.
    pub fn convert(&self, markdown: &str, renderer: &dyn MathRenderer) -> Converted {
        let (protected, equations) = protect(markdown);

        let parser = Parser::new_ext(&protected, self.options);
        let events: Vec<Event> = parser.collect();

        let headings = collect_headings(&events, &equations);
        let events = attach_heading_ids(events, &headings);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        let html_output = resolve(&html_output, &equations, renderer);

        let toc = if headings.is_empty() {
            None
        } else {
            Some(render_toc(&headings))
        };

        Converted {
            html: html_output,
            toc,
        }
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_headings(events: &[Event], equations: &Equations) -> Vec<TocItem> {
    let mut toc = Vec::new();
    let mut current: Option<(u32, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((*level as u32, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, ref mut title)) = current {
                    title.push_str(text.as_ref());
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current.take() {
                    // The event stream is protected, so a heading with math
                    // still holds placeholder tokens here. Titles and slugs
                    // get the original equation bodies back.
                    let title = equations.restore_text(&title);
                    let id = slugify(&title);
                    toc.push(TocItem { level, title, id });
                }
            }
            _ => {}
        }
    }

    toc
}

fn attach_heading_ids<'a>(events: Vec<Event<'a>>, headings: &[TocItem]) -> Vec<Event<'a>> {
    let mut heading_iter = headings.iter();
    let mut result = Vec::with_capacity(events.len());

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level,
                mut id,
                classes,
                attrs,
            }) => {
                if id.is_none() {
                    if let Some(next) = heading_iter.next() {
                        id = Some(CowStr::Boxed(next.id.clone().into_boxed_str()));
                    }
                }
                result.push(Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }));
            }
            other => result.push(other),
        }
    }

    result
}

fn render_toc(headings: &[TocItem]) -> String {
    let mut out = String::from(r#"<nav class="toc"><h2>Contents</h2><ul>"#);
    for h in headings {
        out.push_str(&format!(
            r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
            h.level,
            h.id,
            escape_html(&h.title)
        ));
    }
    out.push_str("</ul></nav>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::MathError;

    struct EchoRenderer;

    impl MathRenderer for EchoRenderer {
        fn render_html(&self, latex: &str, _display: bool) -> Result<String, MathError> {
            Ok(latex.to_string())
        }

        fn render_svg(&self, latex: &str, _display: bool) -> Result<String, MathError> {
            Ok(latex.to_string())
        }
    }

    fn convert(md: &str) -> Converted {
        MarkdownProcessor::new().convert(md, &EchoRenderer)
    }

    #[test]
    fn basic_markdown() {
        let out = convert("# Hello World\n\nThis is a **test**.");
        assert!(out.html.contains("<h1"));
        assert!(out.html.contains("<strong>test</strong>"));
    }

    #[test]
    fn tables_get_the_formatting_class() {
        let md = "| A | B |\n|---|---|\n| 1 | 2 |\n";
        let out = convert(md);
        assert!(out.html.contains(r#"<table class="md-table">"#));
        assert!(out.html.contains("<th>A</th>"));
    }

    #[test]
    fn inline_math_survives_the_parser() {
        let out = convert("Energy: $E = mc^2$");
        assert!(out.html.contains(r#"class="math-inline""#));
        assert!(out.html.contains("E = mc^2"));
        assert!(!out.html.contains("%%%INLINE_MATH_0%%%"));
    }

    #[test]
    fn display_math_is_not_paragraph_wrapped() {
        let out = convert("$$\na^2+b^2=c^2\n$$");
        assert!(out.html.contains(r#"class="math-display""#));
        assert!(!out.html.contains(r#"<p><div class="math-display""#));
        assert!(!out.html.contains("%%%DISPLAY_MATH_0%%%"));
    }

    #[test]
    fn display_math_inside_list_item_resolves() {
        let out = convert("- first\n- $$x+y$$\n");
        assert!(!out.html.contains("%%%"), "got: {}", out.html);
        assert!(out.html.contains(r#"class="math-display""#));
    }

    #[test]
    fn no_placeholders_survive_mixed_documents() {
        let md = "# T\n\n$a$ and $$b$$\n\n- item $c$\n\n| X |\n|---|\n| $d$ |\n";
        let out = convert(md);
        assert!(!out.html.contains("%%%"), "got: {}", out.html);
    }

    #[test]
    fn toc_collects_heading_anchors() {
        let out = convert("# First\n\n## Second Part\n");
        let toc = out.toc.expect("toc present");
        assert!(toc.contains(r##"href="#first""##));
        assert!(toc.contains(r##"href="#second-part""##));
        assert!(out.html.contains(r#"id="second-part""#));
    }

    #[test]
    fn heading_math_keeps_the_toc_placeholder_free() {
        let out = convert("# Energy $E = mc^2$\n\nbody");
        let toc = out.toc.expect("toc present");
        assert!(!toc.contains("%%%"), "got: {toc}");
        assert!(toc.contains("E = mc^2"));
        // The slug comes from the restored title, not the token.
        assert!(toc.contains(r##"href="#energy-e-mc2""##), "got: {toc}");
        assert!(out.html.contains(r#"id="energy-e-mc2""#));
    }

    #[test]
    fn no_toc_without_headings() {
        assert!(convert("just text").toc.is_none());
    }
}
