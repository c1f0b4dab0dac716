//! Template conversion.
//!
//! Convert keeps the template's cover and back pages as raw slices and
//! replaces only the body section: every classified input paragraph is
//! re-emitted through the paragraph builder in the template's formatting.
//! The template's own section-break paragraph closes the rebuilt body so
//! the three-section layout survives untouched.

use crate::classify::{classify_document, ClassifyContext};
use crate::docx::{
    parse_paragraph_xml, parse_table_xml, strip_runs, NumberingMap, ParagraphBuilder, StyleMap,
};
use crate::error::Result;
use crate::guard;
use crate::model::{BodyItem, BodyItemKind, Document, Paragraph, SemanticRole};
use crate::template::TemplateConfig;

/// Convert a classified input document into the template's layout.
///
/// Both documents must follow the cover/body/back section layout; either
/// one failing to partition is a structural error. When `title` is None the
/// input's own Title paragraph (if any) becomes the cover title.
pub fn convert_documents(
    template: &Document,
    input: &mut Document,
    styles: &StyleMap,
    numbering: &NumberingMap,
    config: &TemplateConfig,
    title: Option<&str>,
) -> Result<Document> {
    let template_zones = guard::partition(template)?;
    let input_zones = guard::partition(input)?;

    guard::tag_protected(input, &input_zones);
    let ctx = ClassifyContext {
        styles,
        numbering,
        config,
    };
    classify_document(input, &input_zones, &ctx);

    // Explicit title, else the input's body title, else whatever already
    // sits on the input's cover in the title style (a previously converted
    // document keeps its title that way).
    let effective_title: Option<String> = match title {
        Some(t) => Some(t.to_string()),
        None => input_zones
            .body
            .clone()
            .filter_map(|i| input.items[i].as_paragraph())
            .find(|p| p.role == Some(SemanticRole::Title))
            .map(|p| p.plain_text().trim().to_string())
            .or_else(|| {
                let title_style = config.style(SemanticRole::Title)?;
                input_zones
                    .cover
                    .clone()
                    .filter_map(|i| input.items[i].as_paragraph())
                    .find(|p| {
                        p.style_id.as_deref() == Some(title_style.style_id.as_str())
                            && !p.is_blank()
                    })
                    .map(|p| p.plain_text().trim().to_string())
            }),
    };

    let mut out = Document::new();
    out.prologue = template.prologue.clone();
    out.epilogue = template.epilogue.clone();

    for index in template_zones.cover.clone() {
        out.items.push(template.items[index].clone());
    }

    out.items
        .extend(build_body_items(input, &input_zones, config)?);

    // The template's body section break, emptied of placeholder text
    let break_item = &template.items[template_zones.body_break()];
    let stripped = strip_runs(&break_item.raw)?;
    let para = parse_paragraph_xml(&stripped)?;
    out.items.push(BodyItem::paragraph(stripped, para));

    for index in template_zones.back.clone() {
        out.items.push(template.items[index].clone());
    }

    if let Some(new_title) = effective_title {
        let out_zones = guard::partition(&out)?;
        guard::replace_cover_title(&mut out, &out_zones, &new_title, config)?;
    }

    tracing::info!(
        body_items = out.items.len(),
        "assembled converted document"
    );
    Ok(out)
}

/// Re-emit the input's body content in template formatting.
fn build_body_items(
    input: &Document,
    zones: &guard::Zones,
    config: &TemplateConfig,
) -> Result<Vec<BodyItem>> {
    let builder = ParagraphBuilder::new(config);
    let mut raws: Vec<String> = vec![builder.spacer()];
    let mut after_bold_bullet = false;

    for index in zones.body.clone() {
        match &input.items[index].kind {
            BodyItemKind::Table(table) if !table.is_empty() => {
                raws.push(builder.spacer());
                raws.push(builder.table(table));
                raws.push(builder.spacer());
                after_bold_bullet = false;
            }
            BodyItemKind::Paragraph(para) => {
                if para.section_break || para.is_blank() {
                    continue;
                }
                emit_paragraph(para, &builder, config, &mut raws, &mut after_bold_bullet);
            }
            _ => {}
        }
    }

    raws.push(builder.spacer());

    raws.into_iter()
        .map(|raw| {
            if raw.starts_with("<w:tbl") {
                let table = parse_table_xml(&raw)?;
                Ok(BodyItem {
                    raw,
                    kind: BodyItemKind::Table(table),
                })
            } else {
                let para = parse_paragraph_xml(&raw)?;
                Ok(BodyItem::paragraph(raw, para))
            }
        })
        .collect()
}

fn emit_paragraph(
    para: &Paragraph,
    builder: &ParagraphBuilder,
    config: &TemplateConfig,
    raws: &mut Vec<String>,
    after_bold_bullet: &mut bool,
) {
    let role = para.role.unwrap_or(SemanticRole::Body);
    let text = strip_bullet_glyph(&para.plain_text(), config);

    match role {
        // The Title moves to the cover; it never appears in the body
        SemanticRole::Title | SemanticRole::Protected => {
            *after_bold_bullet = false;
        }
        SemanticRole::H1 => {
            raws.push(builder.spacer());
            raws.push(builder.heading1(&text));
            raws.push(builder.spacer());
            *after_bold_bullet = false;
        }
        SemanticRole::H2 => {
            raws.push(builder.heading2(&text));
            *after_bold_bullet = false;
        }
        SemanticRole::H3 => {
            raws.push(builder.subhead(&text));
            *after_bold_bullet = false;
        }
        SemanticRole::Bullet => {
            let depth = para.numbering.as_ref().map(|n| n.level).unwrap_or(0);
            raws.push(builder.bullet(&text, depth, false));
            *after_bold_bullet = false;
        }
        SemanticRole::BoldBulletHeading => {
            let (heading, rest) = split_bold_heading(para, config);
            raws.push(builder.bullet(&heading, 0, true));
            if !rest.is_empty() {
                raws.push(builder.indented_body(&rest));
            }
            *after_bold_bullet = true;
        }
        SemanticRole::Body => {
            if *after_bold_bullet {
                // Descriptions under a bold bullet heading stay aligned
                // with the bullet text
                raws.push(builder.indented_body(&text));
            } else {
                raws.push(builder.body(&text));
            }
        }
    }
}

/// Drop a leading literal bullet glyph and the whitespace after it.
fn strip_bullet_glyph(text: &str, config: &TemplateConfig) -> String {
    let trimmed = text.trim();
    if let Some(first) = trimmed.chars().next() {
        if config.is_bullet_glyph(first) {
            return trimmed[first.len_utf8()..].trim_start().to_string();
        }
    }
    trimmed.to_string()
}

/// Split a bold bullet heading into its bold heading text and any trailing
/// regular text, keeping run order within each half.
fn split_bold_heading(para: &Paragraph, config: &TemplateConfig) -> (String, String) {
    let mut heading = String::new();
    let mut rest = String::new();
    let mut in_rest = false;

    for run in &para.runs {
        if !in_rest && !run.style.bold && !run.is_blank() {
            in_rest = true;
        }
        if in_rest {
            rest.push_str(&run.text);
        } else {
            heading.push_str(&run.text);
        }
    }

    (
        strip_bullet_glyph(&heading, config),
        rest.trim().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NumberingRef, TextRun, TextStyle};

    fn break_paragraph_raw() -> (String, Paragraph) {
        let raw = r#"<w:p><w:pPr><w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:pPr></w:p>"#;
        (raw.to_string(), parse_paragraph_xml(raw).unwrap())
    }

    fn template_doc() -> Document {
        let mut doc = Document::new();
        doc.prologue = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#.to_string();
        doc.epilogue = "</w:body></w:document>".to_string();

        let cover_raw = r#"<w:p><w:pPr><w:pStyle w:val="CoverText-Arial18pt"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="36"/></w:rPr><w:t>Placeholder Title</w:t></w:r></w:p>"#;
        doc.items.push(BodyItem::paragraph(
            cover_raw,
            parse_paragraph_xml(cover_raw).unwrap(),
        ));
        let (raw, para) = break_paragraph_raw();
        doc.items.push(BodyItem::paragraph(raw, para));

        let body_raw = r#"<w:p><w:r><w:t>template body placeholder</w:t></w:r></w:p>"#;
        doc.items.push(BodyItem::paragraph(
            body_raw,
            parse_paragraph_xml(body_raw).unwrap(),
        ));
        let (raw, para) = break_paragraph_raw();
        doc.items.push(BodyItem::paragraph(raw, para));

        let back_raw = r#"<w:p><w:r><w:t>Back page contacts</w:t></w:r></w:p>"#;
        doc.items.push(BodyItem::paragraph(
            back_raw,
            parse_paragraph_xml(back_raw).unwrap(),
        ));
        doc
    }

    fn input_doc() -> Document {
        let mut doc = Document::new();
        doc.prologue = "<w:document><w:body>".to_string();
        doc.epilogue = "</w:body></w:document>".to_string();

        doc.items
            .push(BodyItem::paragraph("<w:p/>", Paragraph::with_text("cover")));
        let (raw, para) = break_paragraph_raw();
        doc.items.push(BodyItem::paragraph(raw, para));

        // Title-shaped paragraph
        let mut title = Paragraph::new();
        title.add_run(TextRun::styled(
            "June Tax News",
            TextStyle {
                bold: true,
                size: Some(40),
                ..Default::default()
            },
        ));
        doc.items.push(BodyItem::paragraph("<w:p/>", title));

        // Section heading
        let mut h1 = Paragraph::new();
        h1.add_run(TextRun::styled(
            "VAT changes",
            TextStyle {
                bold: true,
                size: Some(36),
                ..Default::default()
            },
        ));
        doc.items.push(BodyItem::paragraph("<w:p/>", h1));

        // Bullet with a literal glyph
        doc.items.push(BodyItem::paragraph(
            "<w:p/>",
            Paragraph::with_text("\u{2022} New rate applies"),
        ));

        // Bold bullet heading with trailing text
        let mut mixed = Paragraph::new();
        mixed.numbering = Some(NumberingRef {
            num_id: "9".to_string(),
            level: 0,
        });
        mixed.add_run(TextRun::styled("Due date", TextStyle::bold()));
        mixed.add_run(TextRun::plain(" is the 25th of the month"));
        doc.items.push(BodyItem::paragraph("<w:p/>", mixed));

        // Following description
        doc.items.push(BodyItem::paragraph(
            "<w:p/>",
            Paragraph::with_text("Late filings accrue interest."),
        ));

        let (raw, para) = break_paragraph_raw();
        doc.items.push(BodyItem::paragraph(raw, para));
        doc.items
            .push(BodyItem::paragraph("<w:p/>", Paragraph::with_text("back")));
        doc
    }

    fn convert_default(title: Option<&str>) -> Document {
        let template = template_doc();
        let mut input = input_doc();
        let styles = StyleMap::default();
        let numbering = NumberingMap::default();
        let config = TemplateConfig::standard();
        convert_documents(&template, &mut input, &styles, &numbering, &config, title).unwrap()
    }

    #[test]
    fn test_back_zone_is_template_bytes() {
        let out = convert_default(Some("My Title"));
        let last = out.items.last().unwrap();
        assert!(last.raw.contains("Back page contacts"));
    }

    #[test]
    fn test_explicit_title_lands_on_cover() {
        let out = convert_default(Some("Quarterly Update"));
        let cover = out.items[0].as_paragraph().unwrap();
        assert_eq!(cover.plain_text(), "Quarterly Update");
        // Formatting of the template's title run survives
        assert!(cover.runs[0].style.bold);
    }

    #[test]
    fn test_input_title_used_when_no_flag() {
        let out = convert_default(None);
        let cover = out.items[0].as_paragraph().unwrap();
        assert_eq!(cover.plain_text(), "June Tax News");
        // And the title paragraph is not duplicated into the body
        assert!(!out
            .items
            .iter()
            .skip(1)
            .any(|i| i.raw.contains("June Tax News")));
    }

    #[test]
    fn test_body_content_restyled() {
        let out = convert_default(Some("T"));
        let xml = out.to_xml();

        assert!(xml.contains("HeadingStyle1-18pt"));
        assert!(xml.contains("VAT changes"));
        assert!(xml.contains("ListBullet-Arial10pt"));
        assert!(xml.contains("New rate applies"));
        // Literal glyph stripped; numbering carries the bullet now
        assert!(!xml.contains("\u{2022} New rate applies"));
        assert!(xml.contains(r#"<w:numId w:val="55"/>"#));
        // Template placeholder body is gone
        assert!(!xml.contains("template body placeholder"));
    }

    #[test]
    fn test_bold_bullet_heading_split() {
        let out = convert_default(Some("T"));
        let xml = out.to_xml();

        assert!(xml.contains("Due date"));
        assert!(xml.contains("is the 25th of the month"));
        // Heading half is a bold bullet, rest is an indented description
        let due_pos = xml.find("Due date").unwrap();
        let rest_pos = xml.find("is the 25th").unwrap();
        assert!(due_pos < rest_pos);
        assert!(xml.contains(r#"<w:ind w:left="426"/>"#));
    }

    #[test]
    fn test_description_after_bold_bullet_is_indented() {
        let out = convert_default(Some("T"));
        let xml = out.to_xml();
        let desc_pos = xml.find("Late filings accrue interest.").unwrap();
        let before = &xml[..desc_pos];
        let para_start = before.rfind("<w:p>").unwrap();
        assert!(xml[para_start..desc_pos].contains(r#"<w:ind w:left="426"/>"#));
    }

    #[test]
    fn test_section_break_survives_with_runs_stripped() {
        let out = convert_default(Some("T"));
        let zones = guard::partition(&out).unwrap();
        let brk = out.items[zones.body_break()].as_paragraph().unwrap();
        assert!(brk.section_break);
        assert!(brk.runs.is_empty());
    }

    #[test]
    fn test_flat_input_is_structure_error() {
        let template = template_doc();
        let mut input = Document::new();
        input
            .items
            .push(BodyItem::paragraph("<w:p/>", Paragraph::with_text("flat")));
        let styles = StyleMap::default();
        let numbering = NumberingMap::default();
        let config = TemplateConfig::standard();
        let result = convert_documents(
            &template,
            &mut input,
            &styles,
            &numbering,
            &config,
            None,
        );
        assert!(matches!(result, Err(crate::error::Error::Structure(_))));
    }

    #[test]
    fn test_reconverted_output_keeps_cover_title() {
        let template = template_doc();
        let styles = StyleMap::default();
        let numbering = NumberingMap::default();
        let config = TemplateConfig::standard();

        let mut once = {
            let mut input = input_doc();
            convert_documents(&template, &mut input, &styles, &numbering, &config, None).unwrap()
        };
        let twice =
            convert_documents(&template, &mut once, &styles, &numbering, &config, None).unwrap();

        let cover = twice.items[0].as_paragraph().unwrap();
        assert_eq!(cover.plain_text(), "June Tax News");
    }

    #[test]
    fn test_convert_output_is_idempotent() {
        let template = template_doc();
        let styles = StyleMap::default();
        let numbering = NumberingMap::default();
        let config = TemplateConfig::standard();

        let mut once = {
            let mut input = input_doc();
            convert_documents(&template, &mut input, &styles, &numbering, &config, None).unwrap()
        };
        let first_xml = once.to_xml();

        let twice = convert_documents(
            &template,
            &mut once,
            &styles,
            &numbering,
            &config,
            Some("June Tax News"),
        )
        .unwrap();

        // Headings, bullets and body text keep their shape on a second pass
        assert!(twice.to_xml().contains("HeadingStyle1-18pt"));
        assert!(twice.to_xml().contains(r#"<w:numId w:val="55"/>"#));
        assert_eq!(
            first_xml.matches("VAT changes").count(),
            twice.to_xml().matches("VAT changes").count()
        );
    }
}
