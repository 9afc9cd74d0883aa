//! HTML fragment to WordprocessingML projection.
//!
//! The projector walks the rcdom tree of the converted fragment and emits a
//! flat sequence of `<w:p>` / `<w:tbl>` blocks. OOXML forbids nested
//! paragraphs, so the walk never opens a `<w:p>` inside another one: inline
//! content accumulates into a run buffer that is flushed as a paragraph
//! whenever a block-level child is reached.
//!
//! Rendered math becomes an inline `<wp:inline>` drawing referencing an SVG
//! part written by the package assembler. All counters live in a
//! per-invocation context, so concurrent exports never share numbering.

use crate::xml::escape_xml;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use mdpress_core::MathRenderer;
use mdpress_types::{ConvertOptions, DocxPalette};
use once_cell::sync::Lazy;
use regex::Regex;

/// Relationship IDs `rId1..=rId3` are fixed (styles, fontTable, settings).
/// Image relationships start after them: equation `i` (1-based) gets
/// `rId{FIXED_RELATIONSHIP_COUNT + i}` and part `media/math{i}.svg`.
pub const FIXED_RELATIONSHIP_COUNT: usize = 3;

const EMU_PER_POINT: f64 = 12_700.0;

/// Fallback extent when the SVG carries no usable dimensions: 120pt x 20pt.
const DEFAULT_EXTENT_EMU: (i64, i64) = (1_524_000, 254_000);

const EMPTY_RUN: &str = r#"<w:r><w:t xml:space="preserve"></w:t></w:r>"#;

static SVG_WIDTH_PT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"width="([0-9.]+)pt""#).expect("valid svg width regex"));
static SVG_HEIGHT_PT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"height="([0-9.]+)pt""#).expect("valid svg height regex"));

/// One SVG part destined for `word/media/math{index}.svg`.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    /// 1-based equation image number; also determines the relationship ID.
    pub index: usize,
    pub svg: String,
}

/// Result of projecting one HTML fragment.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Complete `word/document.xml` content.
    pub document_xml: String,
    /// SVG parts referenced by the document, in relationship order.
    pub media: Vec<MediaBlob>,
}

struct ProjectionContext<'a> {
    renderer: &'a dyn MathRenderer,
    palette: DocxPalette,
    image_count: usize,
    media: Vec<MediaBlob>,
}

/// Project an HTML fragment (the resolver's output) into WordprocessingML.
pub fn project(html: &str, opts: &ConvertOptions, renderer: &dyn MathRenderer) -> Projection {
    // The DOM must outlive the walk: rcdom's iterative `Drop` empties every
    // descendant's child list, even for nodes still held via `Handle`.
    let dom = parse_html(html);
    let body = find_body(&dom);

    let mut ctx = ProjectionContext {
        renderer,
        palette: opts.theme.docx(),
        image_count: 0,
        media: Vec::new(),
    };

    let mut out = String::with_capacity(html.len() * 2);
    front_matter(opts, &ctx.palette, &mut out);

    let children = match &body {
        Some(body) => child_handles(body),
        None => Vec::new(),
    };
    flow_children(&children, None, &mut ctx, &mut out);

    let document_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{out}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720"/></w:sectPr></w:body></w:document>"#
    );

    Projection {
        document_xml,
        media: ctx.media,
    }
}

fn front_matter(opts: &ConvertOptions, palette: &DocxPalette, out: &mut String) {
    out.push_str(&format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(&opts.title)
    ));
    if !opts.author.is_empty() {
        out.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="Subtitle"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_xml(&opts.author)
        ));
    }
    if !opts.date.is_empty() {
        out.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="Subtitle"/></w:pPr><w:r><w:rPr><w:color w:val="{}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            palette.subtitle,
            escape_xml(&opts.date)
        ));
    }
}

// --- DOM access ------------------------------------------------------------

fn parse_html(fragment: &str) -> RcDom {
    let page = format!("<!DOCTYPE html><html><head></head><body>{fragment}</body></html>");
    parse_document(RcDom::default(), Default::default()).one(page)
}

fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

fn attr(node: &Handle, wanted: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| a.name.local.as_ref() == wanted)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

fn has_class(node: &Handle, class: &str) -> bool {
    attr(node, "class")
        .map(|c| c.split_whitespace().any(|part| part == class))
        .unwrap_or(false)
}

fn child_handles(node: &Handle) -> Vec<Handle> {
    node.children.borrow().iter().cloned().collect()
}

fn find_body(dom: &RcDom) -> Option<Handle> {
    fn walk(node: &Handle) -> Option<Handle> {
        if tag_name(node).as_deref() == Some("body") {
            return Some(node.clone());
        }
        for child in node.children.borrow().iter() {
            if let Some(found) = walk(child) {
                return Some(found);
            }
        }
        None
    }
    walk(&dom.document)
}

// --- Block dispatch --------------------------------------------------------

/// Block-level shapes the projector understands. Everything else is either
/// inline (collected into runs) or an unknown container handled as
/// [`BlockTag::Other`].
enum BlockTag {
    Heading(u8),
    Paragraph,
    CodeBlock,
    BulletList,
    NumberList,
    Quote,
    Table,
    MathDisplay,
    Toc,
    Other,
}

const INLINE_TAGS: &[&str] = &[
    "a", "b", "strong", "i", "em", "code", "span", "br", "img", "svg", "del", "s", "sub", "sup",
    "u", "input",
];

/// Classify an element as a block shape, or `None` for inline content.
fn classify(node: &Handle) -> Option<BlockTag> {
    let tag = tag_name(node)?;
    let block = match tag.as_str() {
        "h1" => BlockTag::Heading(1),
        "h2" => BlockTag::Heading(2),
        "h3" => BlockTag::Heading(3),
        // Word heading styles stop at 4; deeper levels collapse.
        "h4" | "h5" | "h6" => BlockTag::Heading(4),
        "p" => BlockTag::Paragraph,
        "pre" => BlockTag::CodeBlock,
        "ul" => BlockTag::BulletList,
        "ol" => BlockTag::NumberList,
        "blockquote" => BlockTag::Quote,
        "table" => BlockTag::Table,
        "nav" if has_class(node, "toc") => BlockTag::Toc,
        "div" if has_class(node, "math-display") => BlockTag::MathDisplay,
        _ if INLINE_TAGS.contains(&tag.as_str()) => return None,
        _ => BlockTag::Other,
    };
    Some(block)
}

/// Walk a sequence of siblings, emitting blocks directly and gathering
/// inline content into paragraphs.
///
/// The run buffer flushes before every block child; a trailing buffer
/// flushes at the end. If the walk produced nothing at all, one empty
/// paragraph is emitted so constructs like `<li></li>` still occupy a line.
fn flow_children(
    nodes: &[Handle],
    style: Option<&str>,
    ctx: &mut ProjectionContext,
    out: &mut String,
) {
    let mut runs = String::new();
    let mut emitted = false;

    for node in nodes {
        if let NodeData::Text { contents } = &node.data {
            let text = contents.borrow().to_string();
            // Pretty-printing whitespace between blocks is not content.
            if runs.is_empty() && text.trim().is_empty() {
                continue;
            }
            push_text_run(&text, &mut runs);
            continue;
        }

        match classify(node) {
            Some(tag) => {
                if !runs.is_empty() {
                    emit_paragraph(style, &runs, out);
                    runs.clear();
                }
                emit_block(node, tag, ctx, out);
                emitted = true;
            }
            None => collect_run(node, ctx, &mut runs),
        }
    }

    if !runs.is_empty() || !emitted {
        emit_paragraph(style, &runs, out);
    }
}

fn emit_paragraph(style: Option<&str>, runs: &str, out: &mut String) {
    let ppr = match style {
        Some(id) => format!(r#"<w:pPr><w:pStyle w:val="{id}"/></w:pPr>"#),
        None => String::new(),
    };
    let body = if runs.is_empty() { EMPTY_RUN } else { runs };
    out.push_str(&format!("<w:p>{ppr}{body}</w:p>"));
}

fn emit_block(node: &Handle, tag: BlockTag, ctx: &mut ProjectionContext, out: &mut String) {
    match tag {
        BlockTag::Heading(level) => {
            let style = format!("Heading{level}");
            flow_children(&child_handles(node), Some(&style), ctx, out);
        }
        BlockTag::Paragraph => flow_children(&child_handles(node), None, ctx, out),
        BlockTag::Quote => {
            // Nested block structure inside a quote flattens into one
            // styled paragraph; Word has no nested-quote notion here.
            let mut runs = String::new();
            for child in child_handles(node) {
                collect_run(&child, ctx, &mut runs);
            }
            emit_paragraph(Some("Quote"), &runs, out);
        }
        BlockTag::CodeBlock => emit_code_block(node, out),
        BlockTag::BulletList => emit_list(node, "ListBullet", ctx, out),
        BlockTag::NumberList => emit_list(node, "ListNumber", ctx, out),
        BlockTag::Table => emit_table(node, ctx, out),
        BlockTag::MathDisplay => {
            let run = math_run(node, true, ctx);
            out.push_str(&format!(
                r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>{run}</w:p>"#
            ));
        }
        // The HTML table of contents has no DOCX counterpart.
        BlockTag::Toc => {}
        BlockTag::Other => flow_children(&child_handles(node), None, ctx, out),
    }
}

/// One `CodeBlock` paragraph per source line. Blank lines still produce a
/// paragraph with an explicit empty run, so vertical structure survives.
fn emit_code_block(node: &Handle, out: &mut String) {
    let text = flatten_text(node);
    let text = text.strip_suffix('\n').unwrap_or(&text);
    for line in text.split('\n') {
        out.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="CodeBlock"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_xml(line)
        ));
    }
}

fn emit_list(node: &Handle, style: &str, ctx: &mut ProjectionContext, out: &mut String) {
    for item in child_handles(node) {
        if tag_name(&item).as_deref() == Some("li") {
            flow_children(&child_handles(&item), Some(style), ctx, out);
        }
    }
}

fn emit_table(node: &Handle, ctx: &mut ProjectionContext, out: &mut String) {
    out.push_str(
        r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="5000" w:type="pct"/></w:tblPr>"#,
    );

    let mut rows = Vec::new();
    collect_rows(node, &mut rows);

    for row in rows {
        out.push_str("<w:tr>");
        for cell in child_handles(&row) {
            let header = match tag_name(&cell).as_deref() {
                Some("th") => true,
                Some("td") => false,
                _ => continue,
            };
            let text = flatten_text(&cell);
            let text = escape_xml(text.trim());
            let tc_pr = if header {
                format!(
                    r#"<w:tcPr><w:shd w:val="clear" w:color="auto" w:fill="{}"/></w:tcPr>"#,
                    ctx.palette.table_header_bg
                )
            } else {
                String::new()
            };
            let r_pr = if header { "<w:rPr><w:b/></w:rPr>" } else { "" };
            out.push_str(&format!(
                r#"<w:tc>{tc_pr}<w:p><w:r>{r_pr}<w:t xml:space="preserve">{text}</w:t></w:r></w:p></w:tc>"#
            ));
        }
        out.push_str("</w:tr>");
    }

    out.push_str("</w:tbl>");
}

/// Collect `<tr>` descendants in document order, looking through `<thead>`
/// and `<tbody>` wrappers the HTML parser inserts.
fn collect_rows(node: &Handle, rows: &mut Vec<Handle>) {
    for child in child_handles(node) {
        match tag_name(&child).as_deref() {
            Some("tr") => rows.push(child),
            Some("thead") | Some("tbody") | Some("tfoot") => collect_rows(&child, rows),
            _ => {}
        }
    }
}

// --- Inline runs -----------------------------------------------------------

fn push_text_run(text: &str, runs: &mut String) {
    runs.push_str(&format!(
        r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_xml(text)
    ));
}

fn styled_run(props: &str, text: &str, runs: &mut String) {
    runs.push_str(&format!(
        r#"<w:r><w:rPr>{props}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_xml(text)
    ));
}

/// Collect inline content into the current run buffer.
///
/// Nested emphasis flattens to the outermost style; the Markdown fragments
/// this projector sees rarely nest further than one level.
fn collect_run(node: &Handle, ctx: &mut ProjectionContext, runs: &mut String) {
    match &node.data {
        NodeData::Text { contents } => push_text_run(&contents.borrow(), runs),
        NodeData::Element { .. } => {
            if has_class(node, "math-src") {
                return;
            }
            if has_class(node, "math-inline") {
                runs.push_str(&math_run(node, false, ctx));
                return;
            }
            if has_class(node, "math-display") {
                // A bare display placeholder resolved mid-flow (list item,
                // table cell) projects as an inline drawing.
                runs.push_str(&math_run(node, true, ctx));
                return;
            }
            let tag = tag_name(node).unwrap_or_default();
            match tag.as_str() {
                "strong" | "b" => styled_run("<w:b/>", &flatten_text(node), runs),
                "em" | "i" => styled_run("<w:i/>", &flatten_text(node), runs),
                "del" | "s" => styled_run("<w:strike/>", &flatten_text(node), runs),
                "code" => styled_run(
                    &format!(
                        r#"<w:rFonts w:ascii="Consolas" w:hAnsi="Consolas"/><w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                        ctx.palette.code_bg
                    ),
                    &flatten_text(node),
                    runs,
                ),
                "a" => styled_run(
                    &format!(
                        r#"<w:color w:val="{}"/><w:u w:val="single"/>"#,
                        ctx.palette.link
                    ),
                    &flatten_text(node),
                    runs,
                ),
                "br" => runs.push_str("<w:r><w:br/></w:r>"),
                // Raw SVG outside a math container carries no text.
                "svg" => {}
                _ => {
                    for child in child_handles(node) {
                        collect_run(&child, ctx, runs);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Plain-text flattening for contexts that take a single run (table cells,
/// emphasis spans). Math containers contribute their LaTeX source; rendered
/// SVG and hidden annotation spans contribute nothing.
fn flatten_text(node: &Handle) -> String {
    fn walk(node: &Handle, out: &mut String) {
        match &node.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => {
                if has_class(node, "math-src") || tag_name(node).as_deref() == Some("svg") {
                    return;
                }
                if has_class(node, "math-inline") || has_class(node, "math-display") {
                    if let Some(tex) = attr(node, "data-tex") {
                        out.push_str(&tex);
                        return;
                    }
                }
                for child in child_handles(node) {
                    walk(&child, out);
                }
            }
            _ => {}
        }
    }
    let mut out = String::new();
    walk(node, &mut out);
    out
}

// --- Math drawings ---------------------------------------------------------

/// Render one equation container into an inline drawing run.
///
/// On render failure the equation degrades to a bracketed LaTeX text run;
/// the projection itself never fails.
fn math_run(node: &Handle, display: bool, ctx: &mut ProjectionContext) -> String {
    let latex = attr(node, "data-tex")
        .or_else(|| math_src_text(node))
        .unwrap_or_default();

    match ctx.renderer.render_svg(&latex, display) {
        Ok(svg) => {
            let (cx, cy) = svg_extent_emu(&svg);
            ctx.image_count += 1;
            let index = ctx.image_count;
            ctx.media.push(MediaBlob {
                index,
                svg,
            });
            drawing_run(index, FIXED_RELATIONSHIP_COUNT + index, cx, cy)
        }
        Err(err) => {
            tracing::warn!(%err, "equation failed during projection, keeping source");
            format!(
                r#"<w:r><w:t xml:space="preserve">[{}]</w:t></w:r>"#,
                escape_xml(&latex)
            )
        }
    }
}

fn math_src_text(node: &Handle) -> Option<String> {
    for child in child_handles(node) {
        if has_class(&child, "math-src") {
            let text = flatten_text(&child);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Read the SVG extent in points and convert to EMUs. Dimensions the
/// renderer did not provide fall back to a fixed extent rather than a
/// zero-sized (invisible) drawing.
fn svg_extent_emu(svg: &str) -> (i64, i64) {
    let dim = |re: &Regex| {
        re.captures(svg)
            .and_then(|c| c[1].parse::<f64>().ok())
            .filter(|v| *v > 0.0)
    };
    match (dim(&SVG_WIDTH_PT), dim(&SVG_HEIGHT_PT)) {
        (Some(w), Some(h)) => (
            (w * EMU_PER_POINT).round() as i64,
            (h * EMU_PER_POINT).round() as i64,
        ),
        _ => DEFAULT_EXTENT_EMU,
    }
}

fn drawing_run(index: usize, rel_id: usize, cx: i64, cy: i64) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{index}" name="Equation {index}"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:nvPicPr><pic:cNvPr id="{index}" name="Equation {index}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="rId{rel_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}
