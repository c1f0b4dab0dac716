//! Table model.

use serde::{Deserialize, Serialize};

/// A table parsed from the user document.
///
/// Only the cell text and grid widths survive parsing; the convert path
/// rebuilds tables from scratch with the template's branded shading, so run
/// formatting inside cells is intentionally not modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Cell texts of the first (header) row
    pub headers: Vec<String>,

    /// Cell texts of the data rows
    pub rows: Vec<Vec<String>>,

    /// Grid column widths in twips, when the source declares them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub col_widths: Vec<i64>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns, taking the widest row into account.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Check if the table has no content.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Get all cell text joined with tabs/newlines.
    pub fn plain_text(&self) -> String {
        let mut text = self.headers.join("\t");
        for row in &self.rows {
            text.push('\n');
            text.push_str(&row.join("\t"));
        }
        text
    }
}
