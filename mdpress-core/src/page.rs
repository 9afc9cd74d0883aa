//! Standalone themed HTML document used by the HTML export and as the
//! input page for the PDF boundary.

use crate::markdown::Converted;
use askama::Template;
use mdpress_types::{ConvertOptions, CssPalette};

#[derive(Template)]
#[template(path = "document.html")]
struct DocumentTemplate<'a> {
    title: &'a str,
    author: &'a str,
    date: &'a str,
    css: String,
    toc_html: Option<&'a str>,
    content: &'a str,
}

/// Wrap a converted fragment in a complete HTML document with theme CSS.
pub fn render_page(converted: &Converted, opts: &ConvertOptions) -> Result<String, askama::Error> {
    let toc_html = if opts.include_table_of_contents {
        converted.toc.as_deref()
    } else {
        None
    };

    DocumentTemplate {
        title: &opts.title,
        author: &opts.author,
        date: &opts.date,
        css: if opts.include_styles {
            theme_css(opts.theme.css())
        } else {
            String::new()
        },
        toc_html,
        content: &converted.html,
    }
    .render()
}

fn theme_css(p: CssPalette) -> String {
    format!(
        r#"* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{
  font-family: 'Segoe UI', 'Calibri', 'Arial', sans-serif;
  font-size: 11pt;
  line-height: 1.6;
  color: {text};
  background: {background};
  padding: 40px;
  max-width: 900px;
  margin: 0 auto;
}}
.document-header {{
  text-align: center;
  margin-bottom: 40px;
  padding-bottom: 20px;
  border-bottom: 2px solid {heading};
}}
.document-title {{ font-size: 24pt; font-weight: bold; color: {heading}; }}
.document-author, .document-date {{ font-size: 11pt; color: {text}; opacity: 0.8; }}
h1, h2, h3, h4, h5, h6 {{ color: {heading}; margin: 1.2em 0 0.5em; }}
h1 {{ font-size: 18pt; }}
h2 {{ font-size: 15pt; }}
h3 {{ font-size: 13pt; }}
p {{ margin: 0.6em 0; }}
a {{ color: {accent}; }}
code {{
  font-family: 'Consolas', 'Monaco', monospace;
  background: {code_bg};
  color: {code_text};
  padding: 1px 4px;
  border-radius: 3px;
}}
pre {{
  background: {code_bg};
  border: 1px solid {border};
  border-radius: 6px;
  padding: 12px;
  overflow-x: auto;
  margin: 0.8em 0;
}}
pre code {{ background: none; padding: 0; }}
blockquote.md-quote {{
  border-left: 3px solid {accent};
  padding-left: 14px;
  margin: 0.8em 0;
  opacity: 0.85;
  font-style: italic;
}}
table.md-table {{
  border-collapse: collapse;
  margin: 0.8em 0;
  width: 100%;
  background: {table_bg};
}}
table.md-table th {{ background: {table_header}; font-weight: bold; }}
table.md-table th, table.md-table td {{
  border: 1px solid {border};
  padding: 6px 10px;
  text-align: left;
}}
.math-display {{ text-align: center; margin: 1em 0; overflow-x: auto; }}
.math-inline svg {{ vertical-align: middle; }}
.math-error {{ color: #ef4444; font-family: monospace; }}
.math-src {{ display: none; }}
nav.toc {{
  border: 1px solid {border};
  border-radius: 6px;
  padding: 12px 18px;
  margin-bottom: 24px;
}}
nav.toc ul {{ list-style: none; }}
nav.toc li.toc-level-2 {{ padding-left: 1em; }}
nav.toc li.toc-level-3 {{ padding-left: 2em; }}
nav.toc li.toc-level-4 {{ padding-left: 3em; }}
@page {{ size: A4; margin: 18mm 15mm; }}
@media print {{
  body {{ padding: 0; max-width: none; }}
  pre, table.md-table, .math-display {{ break-inside: avoid; }}
}}
"#,
        text = p.text,
        background = p.background,
        heading = p.heading,
        accent = p.accent,
        code_bg = p.code_bg,
        code_text = p.code_text,
        border = p.border,
        table_bg = p.table_bg,
        table_header = p.table_header,
    )
}
