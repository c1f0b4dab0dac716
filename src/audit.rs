//! Template-compliance audit.
//!
//! Runs six independent formatting checks over every body-zone paragraph
//! and marks violators with yellow highlights directly in their raw XML.
//! Paragraphs that pass are never rewritten, so a clean document audits to
//! a byte-identical copy.

use crate::docx::highlight_paragraph;
use crate::error::Result;
use crate::guard::Zones;
use crate::model::{Document, Paragraph, SemanticRole};
use crate::template::TemplateConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The six audit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Font,
    BodySize,
    H1Size,
    NoUnicodeBullets,
    LineSpacing,
    IndentValues,
}

impl RuleId {
    /// Short name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            RuleId::Font => "font",
            RuleId::BodySize => "body-size",
            RuleId::H1Size => "h1-size",
            RuleId::NoUnicodeBullets => "no-unicode-bullets",
            RuleId::LineSpacing => "line-spacing",
            RuleId::IndentValues => "indent-values",
        }
    }
}

/// One formatting violation found by the audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Body item index of the offending paragraph
    pub item: usize,
    /// Which rule fired
    pub rule: RuleId,
    /// What the template requires
    pub expected: String,
    /// What the document actually has
    pub observed: String,
    /// Leading text of the paragraph, for the report
    pub text: String,
}

/// Result of auditing one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    /// All violations in document order
    pub violations: Vec<Violation>,
    /// Number of body paragraphs checked
    pub paragraphs_checked: usize,
    /// Number of paragraphs with at least one violation
    pub paragraphs_flagged: usize,
}

impl AuditReport {
    /// Check if the document passed every rule.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violation counts per rule.
    pub fn counts_by_rule(&self) -> BTreeMap<RuleId, usize> {
        let mut counts = BTreeMap::new();
        for v in &self.violations {
            *counts.entry(v.rule).or_insert(0) += 1;
        }
        counts
    }

    /// One-line summary for logs and CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{} violation(s) in {} of {} paragraph(s)",
            self.violations.len(),
            self.paragraphs_flagged,
            self.paragraphs_checked
        )
    }
}

/// Audit every body-zone paragraph and highlight violators in place.
///
/// The cover and back zones are never inspected or touched. Returns the
/// report; the document carries the highlight markup afterwards.
pub fn audit(doc: &mut Document, zones: &Zones, config: &TemplateConfig) -> Result<AuditReport> {
    let mut report = AuditReport::default();
    let mut flagged = Vec::new();

    for index in zones.body.clone() {
        let Some(para) = doc.items[index].as_paragraph() else {
            continue;
        };
        if para.role == Some(SemanticRole::Protected) {
            continue;
        }
        report.paragraphs_checked += 1;

        let before = report.violations.len();
        check_paragraph(index, para, config, &mut report.violations);
        if report.violations.len() > before {
            report.paragraphs_flagged += 1;
            flagged.push(index);
        }
    }

    for index in flagged {
        let item = &mut doc.items[index];
        item.raw = highlight_paragraph(&item.raw)?;
    }

    tracing::info!(
        violations = report.violations.len(),
        checked = report.paragraphs_checked,
        "audit complete"
    );
    Ok(report)
}

/// Apply all six checks to one paragraph.
fn check_paragraph(
    index: usize,
    para: &Paragraph,
    config: &TemplateConfig,
    out: &mut Vec<Violation>,
) {
    let role = para.role.unwrap_or(SemanticRole::Body);
    let text = snippet(para);
    let mut push = |rule: RuleId, expected: String, observed: String| {
        out.push(Violation {
            item: index,
            rule,
            expected,
            observed,
            text: text.clone(),
        });
    };

    // Font: explicit run fonts must be the template font (glyph fonts
    // exempt).
    for run in &para.runs {
        if let Some(font) = &run.style.font {
            if !config.font_allowed(font) {
                push(
                    RuleId::Font,
                    config.required_font.clone(),
                    font.clone(),
                );
                break;
            }
        }
    }

    // BodySize: body copy runs at the body size.
    if role == SemanticRole::Body {
        if let Some(target) = config.style(SemanticRole::Body) {
            if let Some(bad) = para
                .runs
                .iter()
                .filter(|r| !r.is_blank())
                .filter_map(|r| r.style.size)
                .find(|&s| s != target.size)
            {
                push(
                    RuleId::BodySize,
                    format!("{} half-points", target.size),
                    format!("{bad} half-points"),
                );
            }
        }
    }

    // H1Size: titles and section headings at heading size, bold.
    if matches!(role, SemanticRole::Title | SemanticRole::H1) {
        if let Some(target) = config.style(SemanticRole::H1) {
            let wrong_size = para
                .runs
                .iter()
                .filter(|r| !r.is_blank())
                .filter_map(|r| r.style.size)
                .find(|&s| s != target.size);
            if let Some(bad) = wrong_size {
                push(
                    RuleId::H1Size,
                    format!("{} half-points bold", target.size),
                    format!("{bad} half-points"),
                );
            } else if !para.all_runs_bold() && !para.is_blank() {
                push(
                    RuleId::H1Size,
                    format!("{} half-points bold", target.size),
                    "not bold".to_string(),
                );
            }
        }
    }

    // NoUnicodeBullets: literal glyphs must come from a numbering
    // definition.
    if let Some(first) = para.leading_char() {
        if config.is_bullet_glyph(first) && para.numbering.is_none() {
            push(
                RuleId::NoUnicodeBullets,
                "numbering reference".to_string(),
                format!("literal '{first}'"),
            );
        }
    }

    // LineSpacing: explicit line spacing from the whitelist only.
    if let Some(line) = para.line_spacing {
        if !config.line_spacing_whitelist.contains(&line) {
            push(
                RuleId::LineSpacing,
                format!("one of {:?}", config.line_spacing_whitelist),
                line.to_string(),
            );
        }
    }

    // IndentValues: list indents from the whitelist only.
    if matches!(
        role,
        SemanticRole::Bullet | SemanticRole::BoldBulletHeading
    ) {
        for value in [para.indent_left, para.indent_hanging].into_iter().flatten() {
            if !config.indent_whitelist.contains(&value) {
                push(
                    RuleId::IndentValues,
                    format!("one of {:?}", config.indent_whitelist),
                    value.to_string(),
                );
                break;
            }
        }
    }
}

fn snippet(para: &Paragraph) -> String {
    let text = para.plain_text();
    let trimmed = text.trim();
    if trimmed.chars().count() <= 60 {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(60).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BodyItem, TextRun, TextStyle};

    fn config() -> TemplateConfig {
        TemplateConfig::standard()
    }

    fn violations_for(para: Paragraph) -> Vec<Violation> {
        let mut out = Vec::new();
        check_paragraph(0, &para, &config(), &mut out);
        out
    }

    fn body_run(text: &str, font: Option<&str>, size: Option<u32>) -> Paragraph {
        let mut para = Paragraph::new();
        para.role = Some(SemanticRole::Body);
        para.add_run(TextRun::styled(
            text,
            TextStyle {
                font: font.map(String::from),
                size,
                ..Default::default()
            },
        ));
        para
    }

    #[test]
    fn test_wrong_font_flagged() {
        let para = body_run("text", Some("Calibri"), Some(20));
        let violations = violations_for(para);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, RuleId::Font);
        assert_eq!(violations[0].observed, "Calibri");
    }

    #[test]
    fn test_symbol_font_exempt() {
        let para = body_run("\u{2022}", Some("Symbol"), Some(20));
        let violations = violations_for(para);
        // Symbol passes the font rule; the glyph rule fires instead since
        // there is no numbering reference
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, RuleId::NoUnicodeBullets);
    }

    #[test]
    fn test_wrong_body_size_flagged() {
        let para = body_run("text", Some("Arial"), Some(22));
        let violations = violations_for(para);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, RuleId::BodySize);
        assert_eq!(violations[0].observed, "22 half-points");
    }

    #[test]
    fn test_calibri_11pt_body_accumulates_both() {
        // Calibri 11pt = the classic pasted-from-email paragraph
        let para = body_run("pasted content", Some("Calibri"), Some(22));
        let violations = violations_for(para);
        let rules: Vec<RuleId> = violations.iter().map(|v| v.rule).collect();
        assert_eq!(rules, vec![RuleId::Font, RuleId::BodySize]);
    }

    #[test]
    fn test_h1_size_and_boldness() {
        let mut para = Paragraph::new();
        para.role = Some(SemanticRole::H1);
        para.add_run(TextRun::styled(
            "Heading",
            TextStyle {
                bold: false,
                size: Some(36),
                ..Default::default()
            },
        ));
        let violations = violations_for(para);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, RuleId::H1Size);
        assert_eq!(violations[0].observed, "not bold");

        let mut small = Paragraph::new();
        small.role = Some(SemanticRole::Title);
        small.add_run(TextRun::styled(
            "Title",
            TextStyle {
                bold: true,
                size: Some(28),
                ..Default::default()
            },
        ));
        let violations = violations_for(small);
        assert_eq!(violations[0].rule, RuleId::H1Size);
    }

    #[test]
    fn test_literal_bullet_flagged() {
        let mut para = Paragraph::with_text("\u{2022} Item one");
        para.role = Some(SemanticRole::Bullet);
        let violations = violations_for(para);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, RuleId::NoUnicodeBullets);
    }

    #[test]
    fn test_numbered_bullet_passes_glyph_rule() {
        let mut para = Paragraph::with_text("Item one");
        para.role = Some(SemanticRole::Bullet);
        para.numbering = Some(crate::model::NumberingRef {
            num_id: "55".to_string(),
            level: 0,
        });
        assert!(violations_for(para).is_empty());
    }

    #[test]
    fn test_line_spacing_whitelist() {
        let mut para = Paragraph::with_text("text");
        para.role = Some(SemanticRole::Body);
        para.line_spacing = Some(276);
        assert!(violations_for(para.clone()).is_empty());

        para.line_spacing = Some(360);
        let violations = violations_for(para);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, RuleId::LineSpacing);
    }

    #[test]
    fn test_indent_whitelist_applies_to_bullets_only() {
        let mut bullet = Paragraph::with_text("item");
        bullet.role = Some(SemanticRole::Bullet);
        bullet.indent_left = Some(999);
        let violations = violations_for(bullet);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, RuleId::IndentValues);

        let mut body = Paragraph::with_text("text");
        body.role = Some(SemanticRole::Body);
        body.indent_left = Some(999);
        assert!(violations_for(body).is_empty());
    }

    #[test]
    fn test_audit_highlights_only_violators() {
        let mut brk = Paragraph::new();
        brk.section_break = true;

        let clean_raw = r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:sz w:val="20"/></w:rPr><w:t>clean</w:t></w:r></w:p>"#;
        let dirty_raw = r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Comic Sans MS"/></w:rPr><w:t>dirty</w:t></w:r></w:p>"#;

        let mut doc = Document::new();
        doc.items
            .push(BodyItem::paragraph("<w:p/>", brk.clone()));
        doc.items.push(BodyItem::paragraph(
            clean_raw,
            crate::docx::parse_paragraph_xml(clean_raw).unwrap(),
        ));
        doc.items.push(BodyItem::paragraph(
            dirty_raw,
            crate::docx::parse_paragraph_xml(dirty_raw).unwrap(),
        ));
        doc.items.push(BodyItem::paragraph("<w:p/>", brk));

        let zones = crate::guard::partition(&doc).unwrap();
        crate::guard::tag_protected(&mut doc, &zones);
        for index in zones.body.clone() {
            if let Some(p) = doc.items[index].as_paragraph_mut() {
                if p.role.is_none() {
                    p.role = Some(SemanticRole::Body);
                }
            }
        }

        let report = audit(&mut doc, &zones, &config()).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.paragraphs_flagged, 1);

        // Clean paragraph byte-identical, violator highlighted
        assert_eq!(doc.items[1].raw, clean_raw);
        assert!(doc.items[2].raw.contains("w:highlight"));
        assert!(doc.items[2].raw.contains("dirty"));
    }

    #[test]
    fn test_report_serialization() {
        let report = AuditReport {
            violations: vec![Violation {
                item: 3,
                rule: RuleId::Font,
                expected: "Arial".to_string(),
                observed: "Calibri".to_string(),
                text: "sample".to_string(),
            }],
            paragraphs_checked: 10,
            paragraphs_flagged: 1,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"rule\":\"font\""));
        assert!(!report.is_clean());
        assert_eq!(report.counts_by_rule().get(&RuleId::Font), Some(&1));
        assert_eq!(report.summary(), "1 violation(s) in 1 of 10 paragraph(s)");
    }
}
