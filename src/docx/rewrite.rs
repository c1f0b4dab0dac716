//! In-place rewriting of paragraph XML.
//!
//! These functions take the raw slice of a single w:p element and return a
//! rewritten slice. Everything they do not touch streams through unchanged,
//! so formatting the caller never asked about survives byte-for-byte.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

const HIGHLIGHT_COLOR: &str = "yellow";
const SHADING_FILL: &str = "FFFF00";

fn write<W: std::io::Write>(writer: &mut Writer<W>, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Write(e.to_string()))
}

fn highlight_element() -> BytesStart<'static> {
    let mut el = BytesStart::new("w:highlight");
    el.push_attribute(("w:val", HIGHLIGHT_COLOR));
    el
}

fn shading_element() -> BytesStart<'static> {
    let mut el = BytesStart::new("w:shd");
    el.push_attribute(("w:val", "clear"));
    el.push_attribute(("w:color", "auto"));
    el.push_attribute(("w:fill", SHADING_FILL));
    el
}

/// Mark a paragraph as a violation: yellow highlight on every run plus
/// yellow shading on the paragraph itself.
///
/// Synthesizes w:rPr / w:pPr when a run or the paragraph has none, and
/// replaces any highlight or shading already present.
pub fn highlight_paragraph(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;
    let mut writer = Writer::new(Vec::new());

    let mut awaiting_ppr = false;
    let mut awaiting_rpr = false;
    let mut in_ppr = false;
    let mut in_rpr = false;
    let mut sub_depth = 0usize;
    let mut skip_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlParse(e.to_string()))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        // A run start with no following rPr gets one synthesized before the
        // next event is handled.
        if awaiting_rpr {
            awaiting_rpr = false;
            match &event {
                Event::Start(e) if e.name().as_ref() == b"w:rPr" => {
                    in_rpr = true;
                    sub_depth = 0;
                    write(&mut writer, event)?;
                    continue;
                }
                Event::Empty(e) if e.name().as_ref() == b"w:rPr" => {
                    write(&mut writer, Event::Start(BytesStart::new("w:rPr")))?;
                    write(&mut writer, Event::Empty(highlight_element()))?;
                    write(&mut writer, Event::End(BytesStart::new("w:rPr").to_end()))?;
                    continue;
                }
                _ => {
                    write(&mut writer, Event::Start(BytesStart::new("w:rPr")))?;
                    write(&mut writer, Event::Empty(highlight_element()))?;
                    write(&mut writer, Event::End(BytesStart::new("w:rPr").to_end()))?;
                }
            }
        }

        // Same for the paragraph start and its pPr.
        if awaiting_ppr {
            awaiting_ppr = false;
            match &event {
                Event::Start(e) if e.name().as_ref() == b"w:pPr" => {
                    in_ppr = true;
                    sub_depth = 0;
                    write(&mut writer, event)?;
                    continue;
                }
                Event::Empty(e) if e.name().as_ref() == b"w:pPr" => {
                    write(&mut writer, Event::Start(BytesStart::new("w:pPr")))?;
                    write(&mut writer, Event::Empty(shading_element()))?;
                    write(&mut writer, Event::End(BytesStart::new("w:pPr").to_end()))?;
                    continue;
                }
                _ => {
                    write(&mut writer, Event::Start(BytesStart::new("w:pPr")))?;
                    write(&mut writer, Event::Empty(shading_element()))?;
                    write(&mut writer, Event::End(BytesStart::new("w:pPr").to_end()))?;
                }
            }
        }

        match event {
            Event::Start(ref e) => {
                let name = e.name().as_ref().to_vec();
                if in_ppr || in_rpr {
                    if sub_depth == 0
                        && ((in_ppr && name == b"w:shd")
                            || (in_rpr && name == b"w:highlight"))
                    {
                        skip_depth = 1;
                        continue;
                    }
                    sub_depth += 1;
                    write(&mut writer, event)?;
                } else {
                    match name.as_slice() {
                        b"w:p" => {
                            write(&mut writer, event)?;
                            awaiting_ppr = true;
                        }
                        b"w:r" => {
                            write(&mut writer, event)?;
                            awaiting_rpr = true;
                        }
                        _ => write(&mut writer, event)?,
                    }
                }
            }
            Event::Empty(ref e) => {
                let name = e.name().as_ref().to_vec();
                if (in_ppr && sub_depth == 0 && name == b"w:shd")
                    || (in_rpr && sub_depth == 0 && name == b"w:highlight")
                {
                    continue;
                }
                write(&mut writer, event)?;
            }
            Event::End(ref e) => {
                let name = e.name().as_ref().to_vec();
                if in_rpr && name == b"w:rPr" && sub_depth == 0 {
                    in_rpr = false;
                    write(&mut writer, Event::Empty(highlight_element()))?;
                    write(&mut writer, event)?;
                } else if in_ppr && name == b"w:pPr" && sub_depth == 0 {
                    in_ppr = false;
                    write(&mut writer, Event::Empty(shading_element()))?;
                    write(&mut writer, event)?;
                } else {
                    if (in_ppr || in_rpr) && sub_depth > 0 {
                        sub_depth -= 1;
                    }
                    write(&mut writer, event)?;
                }
            }
            Event::Eof => break,
            _ => write(&mut writer, event)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::Write(e.to_string()))
}

/// Replace the text of a paragraph with a new title.
///
/// The first run keeps its formatting and gets the new text; every run
/// after it is dropped. Paragraphs without runs are returned unchanged.
pub fn set_title_text(xml: &str, title: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;
    let mut writer = Writer::new(Vec::new());

    let mut seen_first_run = false;
    let mut replaced = false;
    let mut in_text = false;
    let mut skip_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlParse(e.to_string()))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"w:r" => {
                    if seen_first_run {
                        skip_depth = 1;
                        continue;
                    }
                    seen_first_run = true;
                    write(&mut writer, event)?;
                }
                b"w:t" if !replaced => {
                    replaced = true;
                    in_text = true;
                    let mut t = BytesStart::new("w:t");
                    t.push_attribute(("xml:space", "preserve"));
                    write(&mut writer, Event::Start(t))?;
                    write(&mut writer, Event::Text(BytesText::new(title)))?;
                }
                _ => write(&mut writer, event)?,
            },
            Event::Empty(ref e) if e.name().as_ref() == b"w:r" => {
                if seen_first_run {
                    continue;
                }
                seen_first_run = true;
                write(&mut writer, event)?;
            }
            Event::Text(_) | Event::GeneralRef(_) if in_text => {}
            Event::End(ref e) if e.name().as_ref() == b"w:t" && in_text => {
                in_text = false;
                write(&mut writer, event)?;
            }
            Event::Eof => break,
            _ => write(&mut writer, event)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::Write(e.to_string()))
}

/// Remove every run from a paragraph, keeping its properties.
///
/// Used on section-break paragraphs taken from the template: the pPr (and
/// its w:sectPr) must survive intact while any placeholder text goes away.
pub fn strip_runs(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;
    let mut writer = Writer::new(Vec::new());

    let mut skip_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlParse(e.to_string()))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(ref e) if e.name().as_ref() == b"w:r" => {
                skip_depth = 1;
            }
            Event::Empty(ref e) if e.name().as_ref() == b"w:r" => {}
            Event::Eof => break,
            _ => write(&mut writer, event)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::Write(e.to_string()))
}
