//! numbering.xml parsing.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Numbering format for a list level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumFormat {
    Bullet,
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    Other,
}

impl NumFormat {
    fn from_str(s: &str) -> Self {
        match s {
            "bullet" => NumFormat::Bullet,
            "decimal" => NumFormat::Decimal,
            "lowerLetter" => NumFormat::LowerLetter,
            "upperLetter" => NumFormat::UpperLetter,
            "lowerRoman" => NumFormat::LowerRoman,
            "upperRoman" => NumFormat::UpperRoman,
            _ => NumFormat::Other,
        }
    }
}

/// One level of an abstract numbering definition.
#[derive(Debug, Clone)]
pub struct NumLevel {
    /// Level index (0-8)
    pub level: u8,
    /// Numbering format
    pub format: NumFormat,
    /// Level text template (e.g., "%1." or a bullet glyph)
    pub text: String,
}

/// An abstract numbering definition (w:abstractNum).
#[derive(Debug, Clone, Default)]
pub struct AbstractNum {
    /// Abstract numbering id
    pub id: String,
    /// Levels by index
    pub levels: HashMap<u8, NumLevel>,
}

/// Collection of numbering definitions from numbering.xml.
///
/// `instances` maps the w:numId values paragraphs reference to abstract
/// definitions, following the indirection that numbering.xml uses.
#[derive(Debug, Clone, Default)]
pub struct NumberingMap {
    /// Abstract definitions by abstract id
    pub abstract_nums: HashMap<String, AbstractNum>,
    /// numId -> abstractNumId
    pub instances: HashMap<String, String>,
}

impl NumberingMap {
    /// Parse numbering definitions from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        if xml.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut map = NumberingMap::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current_abstract: Option<AbstractNum> = None;
        let mut current_level: Option<NumLevel> = None;
        let mut current_num_id: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                    b"w:abstractNum" => {
                        let mut def = AbstractNum::default();
                        if let Some(id) = attr_val(&e, b"w:abstractNumId") {
                            def.id = id;
                        }
                        current_abstract = Some(def);
                    }
                    b"w:lvl" if current_abstract.is_some() => {
                        let level = attr_val(&e, b"w:ilvl")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                        current_level = Some(NumLevel {
                            level,
                            format: NumFormat::Other,
                            text: String::new(),
                        });
                    }
                    b"w:num" => {
                        current_num_id = attr_val(&e, b"w:numId");
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(e)) => match e.name().as_ref() {
                    b"w:numFmt" => {
                        if let Some(ref mut level) = current_level {
                            if let Some(val) = attr_val(&e, b"w:val") {
                                level.format = NumFormat::from_str(&val);
                            }
                        }
                    }
                    b"w:lvlText" => {
                        if let Some(ref mut level) = current_level {
                            if let Some(val) = attr_val(&e, b"w:val") {
                                level.text = val;
                            }
                        }
                    }
                    b"w:abstractNumId" => {
                        if let Some(ref num_id) = current_num_id {
                            if let Some(val) = attr_val(&e, b"w:val") {
                                map.instances.insert(num_id.clone(), val);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                    b"w:lvl" => {
                        if let (Some(def), Some(level)) =
                            (current_abstract.as_mut(), current_level.take())
                        {
                            def.levels.insert(level.level, level);
                        }
                    }
                    b"w:abstractNum" => {
                        if let Some(def) = current_abstract.take() {
                            map.abstract_nums.insert(def.id.clone(), def);
                        }
                    }
                    b"w:num" => {
                        current_num_id = None;
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Resolve the level definition a (numId, ilvl) pair points at.
    pub fn level(&self, num_id: &str, ilvl: u8) -> Option<&NumLevel> {
        let abstract_id = self.instances.get(num_id)?;
        self.abstract_nums.get(abstract_id)?.levels.get(&ilvl)
    }

    /// Check whether a numbering reference is a bullet list.
    ///
    /// Unknown numIds count as bullets: a paragraph carrying a numPr is a
    /// list item even when numbering.xml does not define its instance.
    pub fn is_bullet(&self, num_id: &str, ilvl: u8) -> bool {
        match self.level(num_id, ilvl) {
            Some(level) => level.format == NumFormat::Bullet,
            None => true,
        }
    }
}

/// Attribute value with character references resolved, so a lvlText of
/// `&#8226;` reads back as the glyph itself.
fn attr_val(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:abstractNum w:abstractNumId="0">
        <w:lvl w:ilvl="0">
            <w:numFmt w:val="bullet"/>
            <w:lvlText w:val="&#8226;"/>
        </w:lvl>
        <w:lvl w:ilvl="1">
            <w:numFmt w:val="decimal"/>
            <w:lvlText w:val="%2."/>
        </w:lvl>
    </w:abstractNum>
    <w:num w:numId="5">
        <w:abstractNumId w:val="0"/>
    </w:num>
</w:numbering>"#;

    #[test]
    fn test_parse_numbering() {
        let map = NumberingMap::parse(SAMPLE).unwrap();
        assert_eq!(map.abstract_nums.len(), 1);
        assert_eq!(map.instances.get("5"), Some(&"0".to_string()));

        let level = map.level("5", 0).unwrap();
        assert_eq!(level.format, NumFormat::Bullet);
        assert_eq!(level.text, "\u{2022}");
    }

    #[test]
    fn test_is_bullet() {
        let map = NumberingMap::parse(SAMPLE).unwrap();
        assert!(map.is_bullet("5", 0));
        assert!(!map.is_bullet("5", 1));
        // Undefined instances still count as list bullets
        assert!(map.is_bullet("99", 0));
    }

    #[test]
    fn test_empty_input() {
        let map = NumberingMap::parse("").unwrap();
        assert!(map.abstract_nums.is_empty());
        assert!(map.is_bullet("1", 0));
    }
}
