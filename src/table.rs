//! Table model (L8): a row/column cursor that expands ODF's `repeat`
//! attributes and rowspan/colspan coverage into a logical coordinate space
//! without materializing one cursor-state object per virtual row - a
//! 1,000,000-times-repeated cell column must not allocate a million
//! structures.

use std::collections::VecDeque;

use crate::xml::Element;

/// A `[start, end)` column range covered by a cell's rowspan.
type ColSpan = (u32, u32);

/// Row/column state for walking a table's rows and cells in source order.
///
/// `future_frames[0]` holds the column ranges covered (by a rowspan from an
/// earlier row) in the row immediately after the current one; `[1]` the row
/// after that, and so on. `add_row` shifts this queue forward by one row.
#[derive(Debug, Default, Clone)]
pub struct TableCursor {
    row: u32,
    col: u32,
    current_row_spans: Vec<ColSpan>,
    future_frames: VecDeque<Vec<ColSpan>>,
}

impl TableCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /// Advances past one or more (possibly virtually repeated) rows.
    pub fn add_row(&mut self, repeat: u32) {
        let repeat = repeat.max(1);
        self.row += repeat;
        self.col = 0;

        if repeat == 1 {
            self.current_row_spans = self.future_frames.pop_front().unwrap_or_default();
        } else {
            // A block of repeated rows can't inherit a rowspan from above:
            // the original row producing that span only covers one of the
            // virtual copies, so treat the block as starting clean.
            self.future_frames.clear();
            self.current_row_spans.clear();
        }

        self.advance_over_covered();
    }

    /// Advances past one or more (possibly virtually repeated) bare column
    /// definitions (`table:table-column`), outside of any row.
    pub fn add_column(&mut self, repeat: u32) {
        self.col += repeat.max(1);
    }

    /// Records a cell spanning `colspan` columns and `rowspan` rows,
    /// repeated `repeat` times horizontally, and advances `col` past it.
    pub fn add_cell(&mut self, colspan: u32, rowspan: u32, repeat: u32) {
        let colspan = colspan.max(1);
        let rowspan = rowspan.max(1);
        let repeat = repeat.max(1);

        let start = self.col;
        let end = start + colspan * repeat;

        for offset in 1..rowspan {
            let idx = (offset - 1) as usize;
            if self.future_frames.len() <= idx {
                self.future_frames.resize(idx + 1, Vec::new());
            }
            self.future_frames[idx].push((start, end));
        }

        self.col = end;
        self.advance_over_covered();
    }

    /// True if `col` falls inside a rowspan-covered range of the current row.
    pub fn is_covered(&self, col: u32) -> bool {
        self.current_row_spans
            .iter()
            .any(|&(s, e)| col >= s && col < e)
    }

    /// Skips `col` forward past any contiguous chain of covered ranges
    /// starting exactly at the current column.
    fn advance_over_covered(&mut self) {
        loop {
            let hit = self
                .current_row_spans
                .iter()
                .find(|&&(s, e)| s == self.col && e > s)
                .copied();
            match hit {
                Some((_, e)) => self.col = e,
                None => break,
            }
        }
    }
}

/// Logical row/column extent of a table, capped per [`crate::config::Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableDimensions {
    pub rows: u32,
    pub cols: u32,
    /// True if estimation stopped early because a limit was hit.
    pub truncated: bool,
}

/// Walks the direct `table:table-row` / `table:table-column` /
/// `table:table-cell` descendants of `table` (ODF vocabulary) and estimates
/// the table's logical dimensions, capping row/column growth at
/// `limit_rows`/`limit_cols` so a pathological `number-columns-repeated`
/// can't blow up memory.
pub fn estimate_dimensions(table: &Element, limit_rows: u32, limit_cols: u32) -> TableDimensions {
    let mut cursor = TableCursor::new();
    let mut max_rows = 0u32;
    let mut max_cols = 0u32;
    let mut truncated = false;

    for child in table.element_children() {
        match child.local_name() {
            "table-row" => {
                let repeat = attr_u32(child, "number-rows-repeated", 1);
                cursor.add_row(repeat);
                max_rows = max_rows.max(cursor.row());

                for cell in child.element_children() {
                    match cell.local_name() {
                        "table-cell" | "covered-table-cell" => {
                            let colspan = attr_u32(cell, "number-columns-spanned", 1);
                            let rowspan = attr_u32(cell, "number-rows-spanned", 1);
                            let repeat = attr_u32(cell, "number-columns-repeated", 1);
                            cursor.add_cell(colspan, rowspan, repeat);
                            max_cols = max_cols.max(cursor.col());
                        },
                        _ => {},
                    }
                }

                if max_rows >= limit_rows || max_cols >= limit_cols {
                    truncated = true;
                    break;
                }
            },
            "table-column" => {
                let repeat = attr_u32(child, "number-columns-repeated", 1);
                cursor.add_column(repeat);
                max_cols = max_cols.max(cursor.col());
            },
            _ => {},
        }
    }

    TableDimensions {
        rows: max_rows.min(limit_rows),
        cols: max_cols.min(limit_cols),
        truncated,
    }
}

fn attr_u32(el: &Element, local: &str, default: u32) -> u32 {
    el.attrs()
        .find(|(name, _)| name.rsplit(':').next() == Some(local))
        .and_then(|(_, v)| v.parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_grid_no_spans() {
        let mut cursor = TableCursor::new();
        cursor.add_row(1);
        cursor.add_cell(1, 1, 3);
        assert_eq!(cursor.col(), 3);
        cursor.add_row(1);
        assert_eq!(cursor.row(), 2);
        assert_eq!(cursor.col(), 0);
    }

    #[test]
    fn rowspan_covers_next_row() {
        let mut cursor = TableCursor::new();
        cursor.add_row(1);
        cursor.add_cell(1, 2, 1); // A at col 0, spans 2 rows
        cursor.add_cell(1, 1, 1); // B at col 1
        assert_eq!(cursor.col(), 2);

        cursor.add_row(1);
        assert!(cursor.is_covered(0));
        assert_eq!(cursor.col(), 1, "column 0 covered by A, first reachable is 1");
    }

    #[test]
    fn repeated_rows_and_columns_spanned_scenario() {
        // one table:table-row[number-rows-repeated=3] containing one
        // table:table-cell[number-columns-repeated=4, number-columns-spanned=2]
        let mut cursor = TableCursor::new();
        cursor.add_row(3);
        assert_eq!(cursor.row(), 3);
        cursor.add_cell(2, 1, 4);
        assert_eq!(cursor.col(), 8);
    }

    #[test]
    fn repeated_row_block_does_not_allocate_per_virtual_row() {
        let mut cursor = TableCursor::new();
        cursor.add_row(1_000_000);
        assert_eq!(cursor.row(), 1_000_000);
        assert!(cursor.future_frames.is_empty());
    }
}
