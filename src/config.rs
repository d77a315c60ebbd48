//! Translation configuration.
//!
//! Unifies what upstream callers think of as two overlapping types,
//! `TranslationConfig` and `Config`, under one struct carrying every
//! recognized option.

/// Gridline rendering mode for spreadsheet tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum TableGridlines {
    /// Do not draw gridlines at all.
    None,
    /// Draw gridlines only where a cell has no explicit border (default).
    #[default]
    Soft,
    /// Always draw gridlines regardless of explicit cell borders.
    Hard,
}

/// Unified translation/processing configuration.
///
/// `Default` reproduces the documented default for every field.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// First page/sheet to emit, 0-based.
    pub entry_offset: u32,
    /// Number of pages/sheets to emit; `0` means all.
    pub entry_count: u32,
    /// Emit one output file per entry instead of a combined document.
    pub split_entries: bool,
    /// Wrap text nodes with edit markers so back-translation can target them.
    pub editable: bool,
    /// Apply text-document pagination.
    pub paging: bool,
    /// Crop this many rows off the top of a spreadsheet before emitting.
    pub table_offset_rows: u32,
    /// Crop this many columns off the left of a spreadsheet before emitting.
    pub table_offset_cols: u32,
    /// Hard cap on rows emitted for any one table.
    pub table_limit_rows: u32,
    /// Hard cap on columns emitted for any one table.
    pub table_limit_cols: u32,
    /// Use the dimension estimator to size a table instead of always
    /// emitting up to the hard cap.
    pub table_limit_by_dimensions: bool,
    /// Gridline rendering mode.
    pub table_gridlines: TableGridlines,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_offset: 0,
            entry_count: 0,
            split_entries: false,
            editable: false,
            paging: false,
            table_offset_rows: 0,
            table_offset_cols: 0,
            table_limit_rows: 10_000,
            table_limit_cols: 500,
            table_limit_by_dimensions: true,
            table_gridlines: TableGridlines::Soft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.entry_offset, 0);
        assert_eq!(cfg.entry_count, 0);
        assert!(!cfg.split_entries);
        assert!(!cfg.editable);
        assert!(!cfg.paging);
        assert_eq!(cfg.table_limit_rows, 10_000);
        assert_eq!(cfg.table_limit_cols, 500);
        assert!(cfg.table_limit_by_dimensions);
        assert_eq!(cfg.table_gridlines, TableGridlines::Soft);
    }
}
