//! Semantic paragraph classification.
//!
//! Each body paragraph is run through an ordered list of predicates; the
//! first one that recognizes the paragraph decides its role. Style-based
//! signals outrank formatting heuristics, so a document that already uses
//! proper heading styles classifies cleanly regardless of how its runs are
//! formatted.

use crate::docx::{NumberingMap, StyleMap};
use crate::guard::Zones;
use crate::model::{Document, Paragraph, SemanticRole};
use crate::template::TemplateConfig;

/// Everything a classification rule may consult besides the paragraph.
pub struct ClassifyContext<'a> {
    pub styles: &'a StyleMap,
    pub numbering: &'a NumberingMap,
    pub config: &'a TemplateConfig,
}

/// Outcome of a single classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    /// Level-1 heading shape; resolves to Title for the first body
    /// paragraph and H1 afterwards.
    TitleOrH1,
    /// A definite role.
    Role(SemanticRole),
    /// Heading-sized and body-sized runs mixed in one paragraph; falls back
    /// to Body with a warning.
    Ambiguous,
}

type Rule = fn(&Paragraph, &ClassifyContext) -> Option<Match>;

/// Ordered classification chain. First match wins.
const RULES: &[(&str, Rule)] = &[
    ("template-style", template_style),
    ("heading-style", heading_style),
    ("outline-level", outline_level),
    ("numbered-list", numbered_list),
    ("glyph-bullet", glyph_bullet),
    ("heading-size", heading_size),
    ("bold-line", bold_line),
];

fn template_style(para: &Paragraph, ctx: &ClassifyContext) -> Option<Match> {
    let style_id = para.style_id.as_deref()?;
    for role in [
        SemanticRole::Title,
        SemanticRole::H1,
        SemanticRole::H2,
        SemanticRole::H3,
        SemanticRole::Bullet,
        SemanticRole::Body,
    ] {
        if let Some(target) = ctx.config.style(role) {
            if target.style_id == style_id {
                return match role {
                    // The cover style appearing in the body is title-shaped;
                    // the H1 style stays H1 so converted output re-classifies
                    // to itself
                    SemanticRole::Title => Some(Match::TitleOrH1),
                    SemanticRole::Bullet if para.leading_run_bold() => {
                        Some(Match::Role(SemanticRole::BoldBulletHeading))
                    }
                    _ => Some(Match::Role(role)),
                };
            }
        }
    }
    None
}

fn heading_style(para: &Paragraph, ctx: &ClassifyContext) -> Option<Match> {
    let style_id = para.style_id.as_deref()?;
    match ctx.styles.heading_level(style_id)? {
        1 => Some(Match::TitleOrH1),
        2 => Some(Match::Role(SemanticRole::H2)),
        _ => Some(Match::Role(SemanticRole::H3)),
    }
}

fn outline_level(para: &Paragraph, _ctx: &ClassifyContext) -> Option<Match> {
    match para.outline_level? {
        0 => Some(Match::TitleOrH1),
        1 => Some(Match::Role(SemanticRole::H2)),
        _ => Some(Match::Role(SemanticRole::H3)),
    }
}

fn numbered_list(para: &Paragraph, ctx: &ClassifyContext) -> Option<Match> {
    // Numbered lists convert to bullets as well; only the glyph differs in
    // the source. Bold runs promote a bullet item to a heading, but not a
    // decimal step list.
    let numbering = para.numbering.as_ref()?;
    let is_bullet = ctx.numbering.is_bullet(&numbering.num_id, numbering.level);
    if is_bullet && para.leading_run_bold() {
        Some(Match::Role(SemanticRole::BoldBulletHeading))
    } else {
        Some(Match::Role(SemanticRole::Bullet))
    }
}

fn glyph_bullet(para: &Paragraph, ctx: &ClassifyContext) -> Option<Match> {
    let first = para.leading_char()?;
    if !ctx.config.is_bullet_glyph(first) {
        return None;
    }
    if para.leading_run_bold() {
        Some(Match::Role(SemanticRole::BoldBulletHeading))
    } else {
        Some(Match::Role(SemanticRole::Bullet))
    }
}

fn heading_size(para: &Paragraph, ctx: &ClassifyContext) -> Option<Match> {
    let max = para.max_run_size()?;
    let min = para.min_run_size()?;
    if max >= ctx.config.h1_size_threshold {
        if min >= ctx.config.h1_size_threshold && para.all_runs_bold() {
            return Some(Match::TitleOrH1);
        }
        // Title-sized but mixed with smaller or non-bold runs
        return Some(Match::Ambiguous);
    }
    if max >= ctx.config.h2_size_threshold
        && min >= ctx.config.h2_size_threshold
        && para.all_runs_bold()
    {
        return Some(Match::Role(SemanticRole::H2));
    }
    None
}

fn bold_line(para: &Paragraph, _ctx: &ClassifyContext) -> Option<Match> {
    if para.all_runs_bold() {
        Some(Match::Role(SemanticRole::H3))
    } else {
        None
    }
}

/// Classify one paragraph, without Title/H1 disambiguation.
fn run_chain(para: &Paragraph, ctx: &ClassifyContext) -> (&'static str, Match) {
    for (name, rule) in RULES {
        if let Some(result) = rule(para, ctx) {
            return (name, result);
        }
    }
    ("default-body", Match::Role(SemanticRole::Body))
}

/// Classify every body-zone paragraph of a document in place.
///
/// Protected paragraphs keep their role; blank paragraphs become Body
/// without going through the chain. The first body paragraph matching a
/// level-1 heading shape becomes the Title; any later match is an H1.
pub fn classify_document(doc: &mut Document, zones: &Zones, ctx: &ClassifyContext) {
    let mut seen_title = false;

    for index in zones.body.clone() {
        let Some(para) = doc.items[index].as_paragraph_mut() else {
            continue;
        };
        if para.role == Some(SemanticRole::Protected) {
            continue;
        }
        if para.is_blank() {
            para.role = Some(SemanticRole::Body);
            continue;
        }

        let (rule, result) = run_chain(para, ctx);
        let role = match result {
            Match::TitleOrH1 => {
                if seen_title {
                    SemanticRole::H1
                } else {
                    seen_title = true;
                    SemanticRole::Title
                }
            }
            Match::Role(role) => role,
            Match::Ambiguous => {
                tracing::warn!(
                    item = index,
                    rule,
                    text = %truncate(&para.plain_text(), 60),
                    "mixed heading and body run sizes, treating as body text"
                );
                SemanticRole::Body
            }
        };
        tracing::debug!(item = index, rule, ?role, "classified paragraph");
        para.role = Some(role);
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}
