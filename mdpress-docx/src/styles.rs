//! Static OOXML parts: the style sheet, font table and settings.
//!
//! The style sheet is a pure function of the theme palette; two calls with
//! the same theme produce byte-identical XML, which keeps package output
//! deterministic.

use mdpress_types::Theme;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Build `word/styles.xml` for the given theme.
pub fn styles_xml(theme: Theme) -> String {
    let p = theme.docx();

    let mut out = String::with_capacity(8 * 1024);
    out.push_str(XML_DECL);
    out.push_str(&format!(r#"<w:styles xmlns:w="{W_NS}">"#));

    // Document defaults: Calibri 11pt, the usual Word baseline.
    out.push_str(&format!(
        r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/><w:color w:val="{normal}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#,
        normal = p.normal
    ));

    out.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    );
    out.push_str(
        r#"<w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont"><w:name w:val="Default Paragraph Font"/></w:style>"#,
    );
    out.push_str(
        r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>"#,
    );

    out.push_str(&format!(
        r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:jc w:val="center"/><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="56"/><w:szCs w:val="56"/><w:color w:val="{title}"/></w:rPr></w:style>"#,
        title = p.title
    ));
    out.push_str(&format!(
        r#"<w:style w:type="paragraph" w:styleId="Subtitle"><w:name w:val="Subtitle"/><w:basedOn w:val="Normal"/><w:pPr><w:jc w:val="center"/><w:spacing w:after="120"/></w:pPr><w:rPr><w:sz w:val="24"/><w:szCs w:val="24"/><w:color w:val="{subtitle}"/></w:rPr></w:style>"#,
        subtitle = p.subtitle
    ));

    heading_style(&mut out, 1, "36", p.heading1);
    heading_style(&mut out, 2, "30", p.heading2);
    heading_style(&mut out, 3, "26", p.heading3);
    heading_style(&mut out, 4, "24", p.heading4);

    out.push_str(&format!(
        r#"<w:style w:type="paragraph" w:styleId="CodeBlock"><w:name w:val="Code Block"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/><w:shd w:val="clear" w:color="auto" w:fill="{code_bg}"/><w:ind w:left="240" w:right="240"/></w:pPr><w:rPr><w:rFonts w:ascii="Consolas" w:hAnsi="Consolas"/><w:sz w:val="20"/><w:szCs w:val="20"/><w:color w:val="{code_text}"/></w:rPr></w:style>"#,
        code_bg = p.code_bg,
        code_text = p.code_text
    ));
    out.push_str(&format!(
        r#"<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720"/><w:pBdr><w:left w:val="single" w:sz="12" w:space="8" w:color="{quote}"/></w:pBdr></w:pPr><w:rPr><w:i/><w:color w:val="{quote}"/></w:rPr></w:style>"#,
        quote = p.quote
    ));
    out.push_str(
        r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720" w:hanging="360"/><w:spacing w:after="40"/></w:pPr></w:style>"#,
    );
    out.push_str(
        r#"<w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="720" w:hanging="360"/><w:spacing w:after="40"/></w:pPr></w:style>"#,
    );
    out.push_str(
        r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style>"#,
    );

    out.push_str("</w:styles>");
    out
}

fn heading_style(out: &mut String, level: u8, half_points: &str, color: &str) {
    out.push_str(&format!(
        r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{outline}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/><w:color w:val="{color}"/></w:rPr></w:style>"#,
        outline = level - 1
    ));
}

/// `word/fontTable.xml`: the fonts the document references.
pub fn font_table_xml() -> String {
    format!(
        r#"{XML_DECL}<w:fonts xmlns:w="{W_NS}"><w:font w:name="Calibri"><w:pitch w:val="variable"/></w:font><w:font w:name="Consolas"><w:pitch w:val="fixed"/></w:font></w:fonts>"#
    )
}

/// `word/settings.xml`: fixed document settings.
pub fn settings_xml() -> String {
    format!(
        r#"{XML_DECL}<w:settings xmlns:w="{W_NS}"><w:zoom w:percent="100"/><w:defaultTabStop w:val="720"/><w:characterSpacingControl w:val="doNotCompress"/></w:settings>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_are_deterministic() {
        assert_eq!(styles_xml(Theme::Color), styles_xml(Theme::Color));
        assert_eq!(
            styles_xml(Theme::BlackAndWhite),
            styles_xml(Theme::BlackAndWhite)
        );
    }

    #[test]
    fn color_theme_uses_blue_headings() {
        let xml = styles_xml(Theme::Color);
        assert!(xml.contains("2E74B5"));
        assert!(xml.contains(r#"w:styleId="Heading3""#));
        assert!(xml.contains("1F4D78"));
    }

    #[test]
    fn bw_theme_has_no_blue() {
        let xml = styles_xml(Theme::BlackAndWhite);
        assert!(!xml.contains("2E74B5"));
        assert!(!xml.contains("0563C1"));
    }

    #[test]
    fn all_projected_styles_exist() {
        let xml = styles_xml(Theme::Color);
        for id in [
            "Title",
            "Subtitle",
            "Heading1",
            "Heading2",
            "Heading3",
            "Heading4",
            "CodeBlock",
            "Quote",
            "ListBullet",
            "ListNumber",
            "TableGrid",
        ] {
            assert!(
                xml.contains(&format!(r#"w:styleId="{id}""#)),
                "missing style {id}"
            );
        }
    }
}
