//! DOCX (WordprocessingML) parsing and rewriting.

mod builder;
mod numbering;
mod reader;
mod rewrite;
mod styles;
mod writer;

pub use builder::ParagraphBuilder;
pub use numbering::{NumFormat, NumberingMap};
pub use reader::{parse_document_xml, parse_paragraph_xml, parse_table_xml, DocxReader};
pub use rewrite::{highlight_paragraph, set_title_text, strip_runs};
pub use styles::{RunProps, Style, StyleMap, StyleType};
pub use writer::{build_package, write_package};

/// Escape special XML characters in text content.
pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Resolve a general entity reference (predefined or character reference)
/// to its text.
pub(crate) fn resolve_general_ref(raw: &[u8]) -> Option<String> {
    let name = String::from_utf8_lossy(raw);
    match name.as_ref() {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                num.parse().ok()?
            };
            char::from_u32(code).map(|c| c.to_string())
        }),
    }
}
