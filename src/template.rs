//! Fixed template configuration.
//!
//! The branded template ships exactly six custom styles and reserves two
//! numbering definitions for converted bullet content. Rule thresholds and
//! whitelists live here as immutable data, loaded once, so the rule engine
//! and style mapper stay declarative: changing a style id or whitelist value
//! never touches control flow.

use crate::model::SemanticRole;
use std::collections::HashMap;

/// Target formatting for one semantic role.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTarget {
    /// Template style id (w:pStyle)
    pub style_id: String,
    /// Required font name
    pub font: String,
    /// Required size in half-points
    pub size: u32,
    /// Whether runs are bold
    pub bold: bool,
    /// Numbering definition id, for list roles
    pub num_id: Option<String>,
}

/// Immutable template contract: style table, numbering ids, and the audit
/// whitelists.
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    /// Font every run must use
    pub required_font: String,
    /// Fonts exempt from the font rule (bullet glyph fonts)
    pub exempt_fonts: Vec<String>,
    /// SemanticRole -> target style (6 entries for the 6 custom styles)
    styles: HashMap<SemanticRole, StyleTarget>,
    /// Reserved numbering id for top-level converted bullets
    pub bullet_num_top: String,
    /// Reserved numbering id for nested converted bullets
    pub bullet_num_nested: String,
    /// Standard left indent for bullet content, twips
    pub bullet_indent: i32,
    /// Accepted w:spacing w:line values
    pub line_spacing_whitelist: Vec<i32>,
    /// Accepted bullet indent values (left/hanging), twips
    pub indent_whitelist: Vec<i32>,
    /// Literal bullet glyphs that must be replaced by numbering references
    pub bullet_glyphs: Vec<char>,
    /// Minimum run size (half-points) that reads as a level-1 heading
    pub h1_size_threshold: u32,
    /// Minimum run size (half-points) that reads as a level-2 heading
    pub h2_size_threshold: u32,
    /// Table shading: header row fill
    pub table_header_fill: String,
    /// Table shading: data row fill
    pub table_body_fill: String,
    /// Table border color
    pub table_border_color: String,
}

impl TemplateConfig {
    /// The standard branded template contract.
    pub fn standard() -> Self {
        let mut styles = HashMap::new();
        styles.insert(
            SemanticRole::Title,
            StyleTarget {
                style_id: "CoverText-Arial18pt".to_string(),
                font: "Arial".to_string(),
                size: 36,
                bold: true,
                num_id: None,
            },
        );
        styles.insert(
            SemanticRole::H1,
            StyleTarget {
                style_id: "HeadingStyle1-18pt".to_string(),
                font: "Arial".to_string(),
                size: 36,
                bold: true,
                num_id: None,
            },
        );
        styles.insert(
            SemanticRole::H2,
            StyleTarget {
                style_id: "HeadingStyle2-14pt".to_string(),
                font: "Arial".to_string(),
                size: 28,
                bold: true,
                num_id: None,
            },
        );
        styles.insert(
            SemanticRole::H3,
            StyleTarget {
                style_id: "BoldSubhead-Arial10pt".to_string(),
                font: "Arial".to_string(),
                size: 20,
                bold: true,
                num_id: None,
            },
        );
        styles.insert(
            SemanticRole::Bullet,
            StyleTarget {
                style_id: "ListBullet-Arial10pt".to_string(),
                font: "Arial".to_string(),
                size: 20,
                bold: false,
                num_id: Some("55".to_string()),
            },
        );
        styles.insert(
            SemanticRole::Body,
            StyleTarget {
                style_id: "BodyCopy-Arial10pt".to_string(),
                font: "Arial".to_string(),
                size: 20,
                bold: false,
                num_id: None,
            },
        );

        Self {
            required_font: "Arial".to_string(),
            exempt_fonts: vec!["Symbol".to_string(), "Wingdings".to_string()],
            styles,
            bullet_num_top: "55".to_string(),
            bullet_num_nested: "56".to_string(),
            bullet_indent: 426,
            line_spacing_whitelist: vec![240, 276, 288, 480],
            indent_whitelist: vec![0, 142, 284, 426, 720],
            bullet_glyphs: vec!['•', '▪', '‣', '►', '◦'],
            h1_size_threshold: 36,
            h2_size_threshold: 28,
            table_header_fill: "F5A800".to_string(),
            table_body_fill: "FDF1E7".to_string(),
            table_border_color: "011E41".to_string(),
        }
    }

    /// Look up the target formatting for a role.
    ///
    /// `BoldBulletHeading` shares the bullet list style with the bold flag
    /// set; `Protected` has no target.
    pub fn target_for(&self, role: SemanticRole) -> Option<StyleTarget> {
        match role {
            SemanticRole::Protected => None,
            SemanticRole::BoldBulletHeading => {
                let mut target = self.styles.get(&SemanticRole::Bullet)?.clone();
                target.bold = true;
                Some(target)
            }
            _ => self.styles.get(&role).cloned(),
        }
    }

    /// Direct access to a mapped style entry.
    pub fn style(&self, role: SemanticRole) -> Option<&StyleTarget> {
        self.styles.get(&role)
    }

    /// Numbering id for a bullet at the given (clamped) depth.
    pub fn bullet_num_for_depth(&self, depth: u8) -> &str {
        if depth == 0 {
            &self.bullet_num_top
        } else {
            &self.bullet_num_nested
        }
    }

    /// Check whether a style id names one of the template's own styles.
    pub fn is_template_style(&self, style_id: &str) -> bool {
        self.styles.values().any(|t| t.style_id == style_id)
    }

    /// Check whether a character is a literal bullet glyph.
    pub fn is_bullet_glyph(&self, ch: char) -> bool {
        self.bullet_glyphs.contains(&ch)
    }

    /// Check whether a font passes the font rule.
    pub fn font_allowed(&self, font: &str) -> bool {
        font.eq_ignore_ascii_case(&self.required_font)
            || self
                .exempt_fonts
                .iter()
                .any(|f| f.eq_ignore_ascii_case(font))
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self::standard()
    }
}
