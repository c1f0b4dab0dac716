//! Parsed document.xml body tree.

use super::{Paragraph, Table};

/// What a top-level body child is, once parsed.
#[derive(Debug, Clone)]
pub enum BodyItemKind {
    /// A paragraph (w:p)
    Paragraph(Paragraph),
    /// A table (w:tbl)
    Table(Table),
    /// Anything else (bookmarks, sdt blocks, the body-level sectPr,
    /// inter-element whitespace), carried through untouched
    Other,
}

/// One top-level child of w:body, with its raw XML slice retained.
///
/// The raw slice is the authoritative serialization: untouched items are
/// written back byte-for-byte, and mutations (audit highlighting, title
/// replacement) rewrite `raw` in place.
#[derive(Debug, Clone)]
pub struct BodyItem {
    /// Raw XML of this body child, exactly as it appeared in the source
    pub raw: String,
    /// Parsed form, when the child is a paragraph or table
    pub kind: BodyItemKind,
}

impl BodyItem {
    /// Create a paragraph item.
    pub fn paragraph(raw: impl Into<String>, para: Paragraph) -> Self {
        Self {
            raw: raw.into(),
            kind: BodyItemKind::Paragraph(para),
        }
    }

    /// Create an opaque item.
    pub fn other(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: BodyItemKind::Other,
        }
    }

    /// Get the parsed paragraph, if this item is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match &self.kind {
            BodyItemKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Get the parsed paragraph mutably, if this item is one.
    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match &mut self.kind {
            BodyItemKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

/// A parsed word/document.xml part.
///
/// `prologue` is everything before the first body child (XML declaration,
/// the w:document open tag, the w:body open tag); `epilogue` is everything
/// from the w:body close tag to the end of the part. Concatenating
/// prologue + item raw slices + epilogue reproduces the part exactly, which
/// is what makes the audit non-mutation and cover/back protection
/// invariants hold at the byte level.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Raw XML before the first body child
    pub prologue: String,
    /// Top-level body children in document order
    pub items: Vec<BodyItem>,
    /// Raw XML from the body close tag to the end of the part
    pub epilogue: String,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over (item index, paragraph) pairs.
    pub fn paragraphs(&self) -> impl Iterator<Item = (usize, &Paragraph)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.as_paragraph().map(|p| (i, p)))
    }

    /// Item indices of paragraphs whose pPr carries a section break.
    pub fn section_break_indices(&self) -> Vec<usize> {
        self.paragraphs()
            .filter(|(_, p)| p.section_break)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of parsed paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Serialize the body part back to XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(
            self.prologue.len()
                + self.epilogue.len()
                + self.items.iter().map(|i| i.raw.len()).sum::<usize>(),
        );
        xml.push_str(&self.prologue);
        for item in &self.items {
            xml.push_str(&item.raw);
        }
        xml.push_str(&self.epilogue);
        xml
    }

    /// Extract all paragraph text as a single string.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for (_, para) in self.paragraphs() {
            text.push_str(&para.plain_text());
            text.push('\n');
        }
        text.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_concatenation() {
        let mut doc = Document::new();
        doc.prologue = "<w:document><w:body>".to_string();
        doc.items
            .push(BodyItem::paragraph("<w:p/>", Paragraph::new()));
        doc.items.push(BodyItem::other("<w:sectPr/>"));
        doc.epilogue = "</w:body></w:document>".to_string();

        assert_eq!(
            doc.to_xml(),
            "<w:document><w:body><w:p/><w:sectPr/></w:body></w:document>"
        );
    }

    #[test]
    fn test_section_break_indices() {
        let mut doc = Document::new();
        doc.items
            .push(BodyItem::paragraph("<w:p/>", Paragraph::new()));
        let mut brk = Paragraph::new();
        brk.section_break = true;
        doc.items.push(BodyItem::paragraph("<w:p/>", brk));
        doc.items.push(BodyItem::other("<w:bookmarkStart/>"));

        assert_eq!(doc.section_break_indices(), vec![1]);
        assert_eq!(doc.paragraph_count(), 2);
    }

    #[test]
    fn test_plain_text() {
        let mut doc = Document::new();
        doc.items
            .push(BodyItem::paragraph("<w:p/>", Paragraph::with_text("one")));
        doc.items
            .push(BodyItem::paragraph("<w:p/>", Paragraph::with_text("two")));
        assert_eq!(doc.plain_text(), "one\ntwo");
    }
}
