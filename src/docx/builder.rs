//! Construction of template-conformant paragraph and table XML.
//!
//! Convert mode never patches the input's run XML; body content is rebuilt
//! from the extracted text using these builders, so the output carries only
//! the template's styles and direct formatting.

use crate::docx::escape_xml;
use crate::model::{SemanticRole, Table};
use crate::template::TemplateConfig;

/// Total grid width used for rebuilt tables, twips.
const TABLE_GRID_WIDTH: i64 = 9164;

/// Builds body paragraphs and tables in the template's formatting.
pub struct ParagraphBuilder<'a> {
    config: &'a TemplateConfig,
}

impl<'a> ParagraphBuilder<'a> {
    pub fn new(config: &'a TemplateConfig) -> Self {
        Self { config }
    }

    /// An empty paragraph used as vertical breathing room around headings
    /// and tables.
    pub fn spacer(&self) -> String {
        let style = self.style_id(SemanticRole::Body);
        format!(r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr></w:p>"#)
    }

    /// A level-1 section heading.
    pub fn heading1(&self, text: &str) -> String {
        let style = self.style_id(SemanticRole::H1);
        let run = self.run(text, 36, true);
        format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style}"/><w:spacing w:before="0" w:after="240"/></w:pPr>{run}</w:p>"#
        )
    }

    /// A subtopic heading. The run size is pinned to 12pt so subtopics sit
    /// visually between the 14pt style default and body copy.
    pub fn heading2(&self, text: &str) -> String {
        let style = self.style_id(SemanticRole::H2);
        let run = self.run(text, 24, true);
        format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style}"/><w:spacing w:line="480" w:lineRule="auto"/></w:pPr>{run}</w:p>"#
        )
    }

    /// A bold inline sub-heading at body size.
    pub fn subhead(&self, text: &str) -> String {
        let style = self.style_id(SemanticRole::H3);
        let run = self.run(text, 20, true);
        format!(r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{run}</w:p>"#)
    }

    /// A bullet list item at the given depth (clamped to one nesting level).
    pub fn bullet(&self, text: &str, depth: u8, bold: bool) -> String {
        let style = self.style_id(SemanticRole::Bullet);
        let num_id = self.config.bullet_num_for_depth(depth.min(1));
        let ilvl = depth.min(1);
        let indent = self.config.bullet_indent;
        let run = self.run(text, 20, bold);
        format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style}"/><w:numPr><w:ilvl w:val="{ilvl}"/><w:numId w:val="{num_id}"/></w:numPr><w:spacing w:line="276" w:lineRule="auto"/><w:ind w:left="{indent}" w:hanging="{indent}"/></w:pPr>{run}</w:p>"#
        )
    }

    /// A plain body paragraph.
    pub fn body(&self, text: &str) -> String {
        let style = self.style_id(SemanticRole::Body);
        let run = self.run(text, 20, false);
        format!(r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{run}</w:p>"#)
    }

    /// A body paragraph indented to align under bullet text, used for
    /// descriptions that follow a bold bullet heading.
    pub fn indented_body(&self, text: &str) -> String {
        let style = self.style_id(SemanticRole::Body);
        let indent = self.config.bullet_indent;
        let run = self.run(text, 20, false);
        format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style}"/><w:ind w:left="{indent}"/></w:pPr>{run}</w:p>"#
        )
    }

    /// Rebuild a table with the template's branded shading and borders.
    ///
    /// Columns are distributed evenly across the page grid; source column
    /// widths are not carried over.
    pub fn table(&self, table: &Table) -> String {
        let cols = table.column_count().max(1);
        let col_width = TABLE_GRID_WIDTH / cols as i64;
        let border = &self.config.table_border_color;

        let mut xml = String::new();
        xml.push_str("<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/>");
        xml.push_str("<w:tblW w:w=\"0\" w:type=\"auto\"/>");
        xml.push_str("<w:tblBorders>");
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            xml.push_str(&format!(
                r#"<w:{side} w:val="single" w:sz="4" w:space="0" w:color="{border}"/>"#
            ));
        }
        xml.push_str("</w:tblBorders>");
        xml.push_str(
            r#"<w:tblCellMar><w:top w:w="57" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="57" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar>"#,
        );
        xml.push_str("</w:tblPr><w:tblGrid>");
        for _ in 0..cols {
            xml.push_str(&format!(r#"<w:gridCol w:w="{col_width}"/>"#));
        }
        xml.push_str("</w:tblGrid>");

        if !table.headers.is_empty() {
            self.push_row(
                &mut xml,
                &table.headers,
                cols,
                col_width,
                &self.config.table_header_fill,
                true,
            );
        }
        for row in &table.rows {
            self.push_row(
                &mut xml,
                row,
                cols,
                col_width,
                &self.config.table_body_fill,
                false,
            );
        }

        xml.push_str("</w:tbl>");
        xml
    }

    fn push_row(
        &self,
        xml: &mut String,
        cells: &[String],
        cols: usize,
        col_width: i64,
        fill: &str,
        bold: bool,
    ) {
        let style = self.style_id(SemanticRole::Body);
        xml.push_str("<w:tr>");
        for i in 0..cols {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            let run = self.run(text, 20, bold);
            xml.push_str(&format!(
                concat!(
                    r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/>"#,
                    r#"<w:shd w:val="clear" w:color="auto" w:fill="{fill}"/></w:tcPr>"#,
                    r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{run}</w:p></w:tc>"#
                ),
                width = col_width,
                fill = fill,
                style = style,
                run = run,
            ));
        }
        xml.push_str("</w:tr>");
    }

    fn style_id(&self, role: SemanticRole) -> String {
        self.config
            .style(role)
            .map(|t| t.style_id.clone())
            .unwrap_or_default()
    }

    fn run(&self, text: &str, size: u32, bold: bool) -> String {
        if text.is_empty() {
            return String::new();
        }
        let font = &self.config.required_font;
        let mut rpr = format!(r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#);
        if bold {
            rpr.push_str("<w:b/>");
        }
        rpr.push_str(&format!(
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#
        ));
        format!(
            r#"<w:r><w:rPr>{rpr}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape_xml(text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::reader::{parse_paragraph_xml, parse_table_xml};

    fn builder_config() -> TemplateConfig {
        TemplateConfig::standard()
    }

    #[test]
    fn test_heading1() {
        let config = builder_config();
        let xml = ParagraphBuilder::new(&config).heading1("Corporate Income Tax");
        let para = parse_paragraph_xml(&xml).unwrap();

        assert_eq!(para.style_id.as_deref(), Some("HeadingStyle1-18pt"));
        assert_eq!(para.plain_text(), "Corporate Income Tax");
        assert!(para.runs[0].style.bold);
        assert_eq!(para.runs[0].style.size, Some(36));
        assert_eq!(para.runs[0].style.font.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_heading2_pins_run_size() {
        let config = builder_config();
        let xml = ParagraphBuilder::new(&config).heading2("Withholding");
        let para = parse_paragraph_xml(&xml).unwrap();
        assert_eq!(para.runs[0].style.size, Some(24));
        assert_eq!(para.line_spacing, Some(480));
    }

    #[test]
    fn test_bullet_depths() {
        let config = builder_config();
        let builder = ParagraphBuilder::new(&config);

        let top = parse_paragraph_xml(&builder.bullet("first", 0, false)).unwrap();
        let nested = parse_paragraph_xml(&builder.bullet("second", 1, false)).unwrap();
        let deep = parse_paragraph_xml(&builder.bullet("third", 4, false)).unwrap();

        assert_eq!(top.numbering.as_ref().unwrap().num_id, "55");
        assert_eq!(top.numbering.as_ref().unwrap().level, 0);
        assert_eq!(nested.numbering.as_ref().unwrap().num_id, "56");
        // Depth clamps to one nesting level
        assert_eq!(deep.numbering.as_ref().unwrap().level, 1);
        assert_eq!(top.indent_left, Some(426));
        assert_eq!(top.indent_hanging, Some(426));
        assert_eq!(top.line_spacing, Some(276));
    }

    #[test]
    fn test_bold_bullet() {
        let config = builder_config();
        let xml = ParagraphBuilder::new(&config).bullet("Due dates", 0, true);
        let para = parse_paragraph_xml(&xml).unwrap();
        assert!(para.runs[0].style.bold);
    }

    #[test]
    fn test_body_and_indented_body() {
        let config = builder_config();
        let builder = ParagraphBuilder::new(&config);

        let body = parse_paragraph_xml(&builder.body("plain")).unwrap();
        assert_eq!(body.style_id.as_deref(), Some("BodyCopy-Arial10pt"));
        assert_eq!(body.indent_left, None);

        let indented = parse_paragraph_xml(&builder.indented_body("desc")).unwrap();
        assert_eq!(indented.indent_left, Some(426));
    }

    #[test]
    fn test_spacer_is_blank() {
        let config = builder_config();
        let para = parse_paragraph_xml(&ParagraphBuilder::new(&config).spacer()).unwrap();
        assert!(para.is_blank());
    }

    #[test]
    fn test_text_is_escaped() {
        let config = builder_config();
        let xml = ParagraphBuilder::new(&config).body("R&D <costs>");
        assert!(xml.contains("R&amp;D &lt;costs&gt;"));
    }

    #[test]
    fn test_table_shading_and_grid() {
        let config = builder_config();
        let source = Table {
            headers: vec!["Form".into(), "Due".into()],
            rows: vec![vec!["VAT-7".into(), "25th".into()]],
            col_widths: vec![1000, 8000],
        };
        let xml = ParagraphBuilder::new(&config).table(&source);

        assert!(xml.contains(r#"w:fill="F5A800""#));
        assert!(xml.contains(r#"w:fill="FDF1E7""#));
        assert!(xml.contains(r#"w:color="011E41""#));
        // Source widths are replaced by an even split
        assert!(xml.contains(r#"<w:gridCol w:w="4582"/>"#));
        assert!(!xml.contains("8000"));

        let rebuilt = parse_table_xml(&xml).unwrap();
        assert_eq!(rebuilt.headers, vec!["Form", "Due"]);
        assert_eq!(rebuilt.rows.len(), 1);
    }

    #[test]
    fn test_table_ragged_rows_padded() {
        let config = builder_config();
        let source = Table {
            headers: vec!["A".into(), "B".into(), "C".into()],
            rows: vec![vec!["1".into()]],
            col_widths: Vec::new(),
        };
        let xml = ParagraphBuilder::new(&config).table(&source);
        let rebuilt = parse_table_xml(&xml).unwrap();
        assert_eq!(rebuilt.rows[0].len(), 3);
    }
}
