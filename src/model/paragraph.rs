//! Paragraph and text run models.

use serde::{Deserialize, Serialize};

/// Semantic role assigned to a paragraph by the classifier.
///
/// Describes what a paragraph *means* (heading level, bullet, body),
/// independent of its current formatting. Paragraphs in the cover or back
/// sections are always `Protected` and receive no further processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    /// Document title (first body paragraph with heading-1 shape).
    Title,
    /// Major section heading.
    H1,
    /// Subtopic heading.
    H2,
    /// Bold inline sub-heading.
    H3,
    /// Bold bullet heading ("• Due date for filing" style).
    BoldBulletHeading,
    /// Regular bullet list item.
    Bullet,
    /// Plain body text.
    Body,
    /// Cover/back page content; never classified or mutated.
    Protected,
}

impl SemanticRole {
    /// Check if content with this role may be mutated.
    pub fn is_mutable(&self) -> bool {
        !matches!(self, SemanticRole::Protected)
    }
}

/// Text style properties of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    /// Italic text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    /// Font name (w:rFonts w:ascii)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    /// Font size in half-points (e.g., 20 = 10pt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    /// Highlight color name (e.g., "yellow")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

impl TextStyle {
    /// Create a new default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bold style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(default, skip_serializing_if = "is_default_style")]
    pub style: TextStyle,
}

fn is_default_style(style: &TextStyle) -> bool {
    *style == TextStyle::default()
}

impl TextRun {
    /// Create a plain text run with no styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a styled text run.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Check if this run is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A paragraph's numbering reference (w:numPr).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    /// Numbering instance id (w:numId)
    pub num_id: String,
    /// Indentation level (w:ilvl, 0 = top level)
    pub level: u8,
}

/// A paragraph of text with its formatting properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in this paragraph
    #[serde(default)]
    pub runs: Vec<TextRun>,

    /// Style ID reference (w:pStyle)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,

    /// Numbering reference, if this paragraph is a list item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbering: Option<NumberingRef>,

    /// Left indent in twips (w:ind w:left)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_left: Option<i32>,

    /// Hanging indent in twips (w:ind w:hanging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_hanging: Option<i32>,

    /// Line spacing (w:spacing w:line)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<i32>,

    /// Outline level (w:outlineLvl), when set directly on the paragraph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_level: Option<u8>,

    /// Whether the paragraph's pPr carries a w:sectPr (section break)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub section_break: bool,

    /// Semantic role assigned by the classifier (None = unclassified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<SemanticRole>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Default::default()
        }
    }

    /// Add a text run to this paragraph.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this paragraph has no visible text.
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.is_blank())
    }

    /// First non-whitespace character of the paragraph text.
    pub fn leading_char(&self) -> Option<char> {
        self.plain_text().trim_start().chars().next()
    }

    /// Check if every text-bearing run is bold.
    pub fn all_runs_bold(&self) -> bool {
        let mut seen = false;
        for run in &self.runs {
            if run.is_blank() {
                continue;
            }
            if !run.style.bold {
                return false;
            }
            seen = true;
        }
        seen
    }

    /// Check if the first text-bearing run is bold.
    pub fn leading_run_bold(&self) -> bool {
        self.runs
            .iter()
            .find(|r| !r.is_blank())
            .map(|r| r.style.bold)
            .unwrap_or(false)
    }

    /// Largest explicit run size (half-points) across text-bearing runs.
    pub fn max_run_size(&self) -> Option<u32> {
        self.runs
            .iter()
            .filter(|r| !r.is_blank())
            .filter_map(|r| r.style.size)
            .max()
    }

    /// Smallest explicit run size (half-points) across text-bearing runs.
    pub fn min_run_size(&self) -> Option<u32> {
        self.runs
            .iter()
            .filter(|r| !r.is_blank())
            .filter_map(|r| r.style.size)
            .min()
    }

    /// Check if this paragraph is a list item.
    pub fn is_list_item(&self) -> bool {
        self.numbering.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_run() {
        let plain = TextRun::plain("Hello");
        assert_eq!(plain.text, "Hello");
        assert!(!plain.is_blank());
        assert!(TextRun::plain("   ").is_blank());
    }

    #[test]
    fn test_paragraph_text() {
        let mut para = Paragraph::with_text("Hello, ");
        para.add_run(TextRun::styled("World", TextStyle::bold()));
        assert_eq!(para.plain_text(), "Hello, World");
        assert!(!para.is_blank());
        assert!(!para.all_runs_bold());
    }

    #[test]
    fn test_leading_char() {
        let para = Paragraph::with_text("  • Item one");
        assert_eq!(para.leading_char(), Some('•'));
        assert_eq!(Paragraph::new().leading_char(), None);
    }

    #[test]
    fn test_all_runs_bold() {
        let mut para = Paragraph::new();
        para.add_run(TextRun::styled("Due date", TextStyle::bold()));
        para.add_run(TextRun::plain("  "));
        assert!(para.all_runs_bold());

        // Empty paragraph is not "bold"
        assert!(!Paragraph::new().all_runs_bold());
    }

    #[test]
    fn test_run_sizes() {
        let mut para = Paragraph::new();
        para.add_run(TextRun::styled(
            "Big",
            TextStyle {
                size: Some(36),
                ..Default::default()
            },
        ));
        para.add_run(TextRun::styled(
            "Small",
            TextStyle {
                size: Some(20),
                ..Default::default()
            },
        ));
        assert_eq!(para.max_run_size(), Some(36));
        assert_eq!(para.min_run_size(), Some(20));
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&SemanticRole::BoldBulletHeading).unwrap();
        assert_eq!(json, "\"bold_bullet_heading\"");
        assert!(SemanticRole::Body.is_mutable());
        assert!(!SemanticRole::Protected.is_mutable());
    }
}
