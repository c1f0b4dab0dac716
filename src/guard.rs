//! Protected-zone partitioning.
//!
//! Branded documents are laid out as three sections: cover page, body, and
//! back page, separated by paragraph-level section breaks. Cover and back
//! content belongs to the brand team and must never be touched; the guard
//! finds the section boundaries and tags everything outside the body as
//! protected before any rule or mapper runs.

use crate::docx::{parse_paragraph_xml, set_title_text};
use crate::error::{Error, Result};
use crate::model::{BodyItemKind, Document, SemanticRole};
use crate::template::TemplateConfig;
use std::ops::Range;

/// Item-index ranges of the three document zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zones {
    /// Cover page, including its section-break paragraph
    pub cover: Range<usize>,
    /// Body content, including the body section-break paragraph
    pub body: Range<usize>,
    /// Back page, through the end of the body element
    pub back: Range<usize>,
}

impl Zones {
    /// Check whether an item index falls in a protected zone.
    pub fn is_protected(&self, index: usize) -> bool {
        self.cover.contains(&index) || self.back.contains(&index)
    }

    /// Item index of the paragraph that closes the body section.
    pub fn body_break(&self) -> usize {
        self.body.end - 1
    }
}

/// Locate the cover, body, and back zones of a document.
///
/// Requires at least two paragraph-level section breaks; documents without
/// them do not follow the branded layout and cannot be processed safely.
pub fn partition(doc: &Document) -> Result<Zones> {
    let breaks = doc.section_break_indices();
    if breaks.len() < 2 {
        return Err(Error::Structure(format!(
            "expected at least 2 section breaks (cover/body/back layout), found {}",
            breaks.len()
        )));
    }

    let first = breaks[0];
    let second = breaks[1];
    Ok(Zones {
        cover: 0..first + 1,
        body: first + 1..second + 1,
        back: second + 1..doc.items.len(),
    })
}

/// Tag every paragraph in the cover and back zones as protected.
pub fn tag_protected(doc: &mut Document, zones: &Zones) {
    for (index, item) in doc.items.iter_mut().enumerate() {
        if zones.is_protected(index) {
            if let Some(para) = item.as_paragraph_mut() {
                para.role = Some(SemanticRole::Protected);
            }
        }
    }
}

/// Replace the cover title of a document in place.
///
/// Targets the cover paragraph styled with the template's title style,
/// falling back to the first cover paragraph with any text. The paragraph's
/// first run keeps its formatting; only the text changes. Returns false when
/// the cover has no paragraph to retitle.
pub fn replace_cover_title(
    doc: &mut Document,
    zones: &Zones,
    title: &str,
    config: &TemplateConfig,
) -> Result<bool> {
    let title_style = config
        .style(SemanticRole::Title)
        .map(|t| t.style_id.clone());

    let mut target: Option<usize> = None;
    let mut fallback: Option<usize> = None;
    for index in zones.cover.clone() {
        let Some(para) = doc.items[index].as_paragraph() else {
            continue;
        };
        if para.style_id.is_some() && para.style_id == title_style {
            target = Some(index);
            break;
        }
        if fallback.is_none() && !para.is_blank() {
            fallback = Some(index);
        }
    }

    let Some(index) = target.or(fallback) else {
        return Ok(false);
    };

    let item = &mut doc.items[index];
    item.raw = set_title_text(&item.raw, title)?;
    item.kind = BodyItemKind::Paragraph(parse_paragraph_xml(&item.raw)?);
    Ok(true)
}
