//! DOCX package reading and document.xml parsing.

use crate::container::OoxmlContainer;
use crate::docx::numbering::NumberingMap;
use crate::docx::styles::StyleMap;
use crate::error::{Error, Result};
use crate::model::{BodyItem, BodyItemKind, Document, NumberingRef, Paragraph, Table, TextRun};
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const NUMBERING_PART: &str = "word/numbering.xml";

/// Reader for a DOCX package.
///
/// Opens the zip container once and parses the style and numbering parts up
/// front; `parse()` then produces the body tree. The parser keeps the raw
/// XML slice of every top-level body child, so a document can be
/// reserialized byte-for-byte when nothing was changed.
pub struct DocxReader {
    container: OoxmlContainer,
    styles: StyleMap,
    numbering: NumberingMap,
}

impl DocxReader {
    /// Open a DOCX file from a path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_container(OoxmlContainer::open(path)?)
    }

    /// Open a DOCX package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_container(OoxmlContainer::from_bytes(data)?)
    }

    /// Wrap an already opened container.
    pub fn from_container(container: OoxmlContainer) -> Result<Self> {
        let styles = if container.exists(STYLES_PART) {
            StyleMap::parse(&container.read_xml(STYLES_PART)?)?
        } else {
            StyleMap::default()
        };
        let numbering = if container.exists(NUMBERING_PART) {
            NumberingMap::parse(&container.read_xml(NUMBERING_PART)?)?
        } else {
            NumberingMap::default()
        };

        Ok(Self {
            container,
            styles,
            numbering,
        })
    }

    /// The parsed styles part.
    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    /// The parsed numbering part.
    pub fn numbering(&self) -> &NumberingMap {
        &self.numbering
    }

    /// The underlying container.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Raw content of word/document.xml.
    pub fn document_xml(&self) -> Result<String> {
        if !self.container.exists(DOCUMENT_PART) {
            return Err(Error::MissingComponent(DOCUMENT_PART.to_string()));
        }
        self.container.read_xml(DOCUMENT_PART)
    }

    /// Parse word/document.xml into a body tree.
    pub fn parse(&self) -> Result<Document> {
        let xml = self.document_xml()?;
        parse_document_xml(&xml)
    }
}

impl std::fmt::Debug for DocxReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxReader")
            .field("styles", &self.styles.styles.len())
            .field("numbering", &self.numbering.abstract_nums.len())
            .finish()
    }
}

/// Parse a document.xml part into prologue, body children, and epilogue.
///
/// Every byte of the input lands in exactly one of the three pieces, so
/// `Document::to_xml()` reproduces the part unchanged.
pub fn parse_document_xml(xml: &str) -> Result<Document> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut doc = Document::new();
    let mut in_body = false;
    let mut prev_pos = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let cur_pos = reader.buffer_position() as usize;

        match event {
            quick_xml::events::Event::Start(ref e) if !in_body => {
                if e.name().as_ref() == b"w:body" {
                    doc.prologue = xml[..cur_pos].to_string();
                    in_body = true;
                }
            }
            quick_xml::events::Event::Start(ref e) if in_body => {
                let name = e.name().as_ref().to_vec();
                let end = skip_to_close(&mut reader, &name)?;
                let raw = &xml[prev_pos..end];
                doc.items.push(parse_body_child(&name, raw)?);
                prev_pos = end;
                continue;
            }
            quick_xml::events::Event::Empty(ref e) if in_body => {
                let name = e.name().as_ref().to_vec();
                let raw = &xml[prev_pos..cur_pos];
                doc.items.push(parse_body_child(&name, raw)?);
            }
            quick_xml::events::Event::End(ref e) if in_body => {
                if e.name().as_ref() == b"w:body" {
                    doc.epilogue = xml[prev_pos..].to_string();
                    return Ok(doc);
                }
            }
            quick_xml::events::Event::Text(_)
            | quick_xml::events::Event::Comment(_)
            | quick_xml::events::Event::CData(_)
            | quick_xml::events::Event::GeneralRef(_)
            | quick_xml::events::Event::PI(_)
                if in_body =>
            {
                // Inter-element whitespace and other stray content
                doc.items.push(BodyItem::other(&xml[prev_pos..cur_pos]));
            }
            quick_xml::events::Event::Eof => {
                if in_body {
                    return Err(Error::XmlParse(
                        "document body is not closed".to_string(),
                    ));
                }
                return Err(Error::XmlParse("no w:body element found".to_string()));
            }
            _ => {}
        }
        prev_pos = cur_pos;
    }
}

/// Consume events until the matching close tag of `name`, returning the byte
/// position just past it.
fn skip_to_close(reader: &mut quick_xml::Reader<&[u8]>, name: &[u8]) -> Result<usize> {
    let mut depth = 1usize;
    loop {
        match reader
            .read_event()
            .map_err(|e| Error::XmlParse(e.to_string()))?
        {
            quick_xml::events::Event::Start(e) if e.name().as_ref() == name => {
                depth += 1;
            }
            quick_xml::events::Event::End(e) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    return Ok(reader.buffer_position() as usize);
                }
            }
            quick_xml::events::Event::Eof => {
                return Err(Error::XmlParse(format!(
                    "unclosed element: {}",
                    String::from_utf8_lossy(name)
                )));
            }
            _ => {}
        }
    }
}

/// Parse one top-level body child from its raw slice.
fn parse_body_child(name: &[u8], raw: &str) -> Result<BodyItem> {
    match name {
        b"w:p" => {
            let para = parse_paragraph_xml(raw)?;
            Ok(BodyItem::paragraph(raw, para))
        }
        b"w:tbl" => {
            let table = parse_table_xml(raw)?;
            Ok(BodyItem {
                raw: raw.to_string(),
                kind: BodyItemKind::Table(table),
            })
        }
        _ => Ok(BodyItem::other(raw)),
    }
}

/// Parse a single w:p element into a Paragraph.
pub fn parse_paragraph_xml(xml: &str) -> Result<Paragraph> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut para = Paragraph::new();
    let mut buf = Vec::new();

    let mut in_ppr = false;
    let mut in_run = false;
    let mut in_text = false;
    let mut in_instr = false;
    let mut depth_in_run = 0usize;
    let mut current_run: Option<TextRun> = None;
    let mut num_id: Option<String> = None;
    let mut num_level: u8 = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                match e.name().as_ref() {
                    b"w:pPr" if !in_run => in_ppr = true,
                    b"w:r" if !in_run => {
                        in_run = true;
                        depth_in_run = 0;
                        current_run = Some(TextRun::default());
                    }
                    b"w:t" if in_run => in_text = true,
                    b"w:instrText" if in_run => in_instr = true,
                    b"w:numPr" if in_ppr => {}
                    b"w:sectPr" if in_ppr => para.section_break = true,
                    _ if in_run => depth_in_run += 1,
                    _ => {}
                }
            }
            Ok(quick_xml::events::Event::Empty(e)) => {
                let name = e.name();
                match name.as_ref() {
                    // Paragraph properties
                    b"w:pStyle" if in_ppr => {
                        para.style_id = attr_val(&e, b"w:val");
                    }
                    b"w:numId" if in_ppr => {
                        num_id = attr_val(&e, b"w:val");
                    }
                    b"w:ilvl" if in_ppr => {
                        num_level = attr_val(&e, b"w:val")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                    }
                    b"w:ind" if in_ppr => {
                        para.indent_left = attr_val(&e, b"w:left")
                            .or_else(|| attr_val(&e, b"w:start"))
                            .and_then(|v| v.parse().ok());
                        para.indent_hanging =
                            attr_val(&e, b"w:hanging").and_then(|v| v.parse().ok());
                    }
                    b"w:spacing" if in_ppr && !in_run => {
                        para.line_spacing =
                            attr_val(&e, b"w:line").and_then(|v| v.parse().ok());
                    }
                    b"w:outlineLvl" if in_ppr => {
                        para.outline_level =
                            attr_val(&e, b"w:val").and_then(|v| v.parse().ok());
                    }
                    b"w:sectPr" if in_ppr => para.section_break = true,
                    // Run properties
                    b"w:b" if in_run => {
                        if let Some(ref mut run) = current_run {
                            run.style.bold = bool_attr(&e, b"w:val").unwrap_or(true);
                        }
                    }
                    b"w:i" if in_run => {
                        if let Some(ref mut run) = current_run {
                            run.style.italic = bool_attr(&e, b"w:val").unwrap_or(true);
                        }
                    }
                    b"w:sz" if in_run => {
                        if let Some(ref mut run) = current_run {
                            run.style.size =
                                attr_val(&e, b"w:val").and_then(|v| v.parse().ok());
                        }
                    }
                    b"w:rFonts" if in_run => {
                        if let Some(ref mut run) = current_run {
                            run.style.font = attr_val(&e, b"w:ascii")
                                .or_else(|| attr_val(&e, b"w:hAnsi"));
                        }
                    }
                    b"w:highlight" if in_run => {
                        if let Some(ref mut run) = current_run {
                            run.style.highlight = attr_val(&e, b"w:val");
                        }
                    }
                    b"w:tab" if in_run => {
                        if let Some(ref mut run) = current_run {
                            run.text.push('\t');
                        }
                    }
                    b"w:br" | b"w:cr" if in_run => {
                        if let Some(ref mut run) = current_run {
                            run.text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Ok(quick_xml::events::Event::Text(e)) => {
                if in_text && !in_instr {
                    if let Some(ref mut run) = current_run {
                        let text = e.decode().map_err(|e| Error::XmlParse(e.to_string()))?;
                        run.text.push_str(&text);
                    }
                }
            }
            Ok(quick_xml::events::Event::GeneralRef(e)) => {
                if in_text && !in_instr {
                    if let Some(ref mut run) = current_run {
                        if let Some(resolved) = crate::docx::resolve_general_ref(e.as_ref()) {
                            run.text.push_str(&resolved);
                        }
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                b"w:pPr" => in_ppr = false,
                b"w:r" if in_run && depth_in_run == 0 => {
                    in_run = false;
                    if let Some(run) = current_run.take() {
                        para.runs.push(run);
                    }
                }
                b"w:t" => in_text = false,
                b"w:instrText" => in_instr = false,
                _ if in_run && depth_in_run > 0 => depth_in_run -= 1,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(id) = num_id {
        para.numbering = Some(NumberingRef {
            num_id: id,
            level: num_level,
        });
    }

    Ok(para)
}

/// Parse a single w:tbl element into a Table.
pub fn parse_table_xml(xml: &str) -> Result<Table> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut table = Table::new();
    let mut buf = Vec::new();

    let mut current_row: Vec<String> = Vec::new();
    let mut current_cell = String::new();
    let mut in_row = false;
    let mut in_cell = false;
    let mut in_text = false;
    let mut row_index = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                b"w:tr" => {
                    in_row = true;
                    current_row.clear();
                }
                b"w:tc" if in_row => {
                    in_cell = true;
                    current_cell.clear();
                }
                b"w:t" if in_cell => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Empty(e)) => {
                if e.name().as_ref() == b"w:gridCol" {
                    if let Some(w) = attr_val(&e, b"w:w").and_then(|v| v.parse().ok()) {
                        table.col_widths.push(w);
                    }
                }
            }
            Ok(quick_xml::events::Event::Text(e)) => {
                if in_text {
                    let text = e.decode().map_err(|e| Error::XmlParse(e.to_string()))?;
                    current_cell.push_str(&text);
                }
            }
            Ok(quick_xml::events::Event::GeneralRef(e)) => {
                if in_text {
                    if let Some(resolved) = crate::docx::resolve_general_ref(e.as_ref()) {
                        current_cell.push_str(&resolved);
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:tc" => {
                    in_cell = false;
                    current_row.push(current_cell.trim().to_string());
                }
                b"w:tr" => {
                    in_row = false;
                    if row_index == 0 {
                        table.headers = current_row.clone();
                    } else {
                        table.rows.push(current_row.clone());
                    }
                    row_index += 1;
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(table)
}

fn attr_val(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

fn bool_attr(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<bool> {
    attr_val(e, key).map(|v| v != "0" && v != "false")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="36"/></w:rPr><w:t>Filing Deadlines</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">Body text </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>here</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#;

    #[test]
    fn test_parse_round_trips_exactly() {
        let doc = parse_document_xml(DOC).unwrap();
        assert_eq!(doc.to_xml(), DOC);
    }

    #[test]
    fn test_parse_body_children() {
        let doc = parse_document_xml(DOC).unwrap();
        assert_eq!(doc.items.len(), 3);
        assert_eq!(doc.paragraph_count(), 2);

        let first = doc.items[0].as_paragraph().unwrap();
        assert_eq!(first.style_id.as_deref(), Some("Heading1"));
        assert_eq!(first.plain_text(), "Filing Deadlines");
        assert!(first.runs[0].style.bold);
        assert_eq!(first.runs[0].style.size, Some(36));

        let second = doc.items[1].as_paragraph().unwrap();
        assert_eq!(second.plain_text(), "Body text here");
        assert!(second.runs[1].style.italic);

        assert!(matches!(doc.items[2].kind, BodyItemKind::Other));
    }

    #[test]
    fn test_parse_paragraph_numbering_and_indent() {
        let xml = r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="5"/></w:numPr><w:ind w:left="720" w:hanging="360"/><w:spacing w:line="276"/></w:pPr><w:r><w:t>item</w:t></w:r></w:p>"#;
        let para = parse_paragraph_xml(xml).unwrap();
        let numbering = para.numbering.unwrap();
        assert_eq!(numbering.num_id, "5");
        assert_eq!(numbering.level, 1);
        assert_eq!(para.indent_left, Some(720));
        assert_eq!(para.indent_hanging, Some(360));
        assert_eq!(para.line_spacing, Some(276));
    }

    #[test]
    fn test_parse_paragraph_section_break() {
        let xml = r#"<w:p><w:pPr><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:pPr></w:p>"#;
        let para = parse_paragraph_xml(xml).unwrap();
        assert!(para.section_break);
        assert!(para.is_blank());
    }

    #[test]
    fn test_parse_paragraph_highlight_and_font() {
        let xml = r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Calibri"/><w:highlight w:val="yellow"/></w:rPr><w:t>marked</w:t></w:r></w:p>"#;
        let para = parse_paragraph_xml(xml).unwrap();
        assert_eq!(para.runs[0].style.font.as_deref(), Some("Calibri"));
        assert_eq!(para.runs[0].style.highlight.as_deref(), Some("yellow"));
    }

    #[test]
    fn test_parse_paragraph_entities() {
        let xml = r#"<w:p><w:r><w:t>R&amp;D &#8226; &lt;tags&gt;</w:t></w:r></w:p>"#;
        let para = parse_paragraph_xml(xml).unwrap();
        assert_eq!(para.plain_text(), "R&D \u{2022} <tags>");
    }

    #[test]
    fn test_parse_paragraph_skips_field_instructions() {
        let xml = r#"<w:p><w:r><w:instrText>PAGE</w:instrText></w:r><w:r><w:t>visible</w:t></w:r></w:p>"#;
        let para = parse_paragraph_xml(xml).unwrap();
        assert_eq!(para.plain_text(), "visible");
    }

    #[test]
    fn test_parse_table() {
        let xml = r#"<w:tbl><w:tblGrid><w:gridCol w:w="4582"/><w:gridCol w:w="4582"/></w:tblGrid><w:tr><w:tc><w:p><w:r><w:t>Form</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Due</w:t></w:r></w:p></w:tc></w:tr><w:tr><w:tc><w:p><w:r><w:t>VAT-7</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>25th</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        let table = parse_table_xml(xml).unwrap();
        assert_eq!(table.headers, vec!["Form", "Due"]);
        assert_eq!(table.rows, vec![vec!["VAT-7".to_string(), "25th".to_string()]]);
        assert_eq!(table.col_widths, vec![4582, 4582]);
    }

    #[test]
    fn test_parse_table_entities() {
        let xml = r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>R&amp;D &#8226; costs</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        let table = parse_table_xml(xml).unwrap();
        assert_eq!(table.headers, vec!["R&D \u{2022} costs"]);
    }

    #[test]
    fn test_table_body_child_round_trip() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:tbl><w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>after</w:t></w:r></w:p></w:body></w:document>"#;
        let doc = parse_document_xml(xml).unwrap();
        assert_eq!(doc.to_xml(), xml);
        assert!(matches!(doc.items[0].kind, BodyItemKind::Table(_)));
        // The paragraph inside the table cell is not a top-level paragraph
        assert_eq!(doc.paragraph_count(), 1);
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let result = parse_document_xml("<w:document></w:document>");
        assert!(result.is_err());
    }
}
