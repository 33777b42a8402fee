//! Row-major text tables and their CSV serialization.

use std::fmt;
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::error::ExtractionError;

/// A table of recognized text, row-major.
///
/// Rows are not required to have the same length: the number of cells per
/// row comes from detected geometry only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV, one record per row and no header row.
    pub fn write_csv(&self, path: &Path, quoting: Quoting) -> Result<(), ExtractionError> {
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .quote_style(quoting.into())
            .from_path(path)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the table as CSV text.
    pub fn to_csv_string(&self, quoting: Quoting) -> Result<String, ExtractionError> {
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .quote_style(quoting.into())
            .from_writer(Vec::<u8>::new());
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        let bytes = writer
            .into_inner()
            .map_err(|error| ExtractionError::Io(error.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read a header-less CSV file back into a table.
    pub fn read_csv(path: &Path) -> Result<Self, ExtractionError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { rows })
    }
}

impl From<Vec<Vec<String>>> for Table {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

/// Plain-text grid, one row per line, columns padded to equal width.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths = vec![0usize; self.column_count()];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        for row in &self.rows {
            let line = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// CSV quoting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quoting {
    /// Quote only fields that need it (image tables).
    #[default]
    Minimal,
    /// Quote every field (PDF tables).
    All,
}

impl From<Quoting> for QuoteStyle {
    fn from(quoting: Quoting) -> Self {
        match quoting {
            Quoting::Minimal => QuoteStyle::Necessary,
            Quoting::All => QuoteStyle::Always,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_minimal_quoting() {
        let t = table(&[&["Name", "Note"], &["a,b", "say \"hi\""]]);
        let csv = t.to_csv_string(Quoting::Minimal).unwrap();
        assert_eq!(csv, "Name,Note\n\"a,b\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_all_quoting() {
        let t = table(&[&["1", ""]]);
        let csv = t.to_csv_string(Quoting::All).unwrap();
        assert_eq!(csv, "\"1\",\"\"\n");
    }

    #[test]
    fn test_ragged_rows_are_written() {
        let t = table(&[&["a", "b", "c"], &["d"]]);
        let csv = t.to_csv_string(Quoting::Minimal).unwrap();
        assert_eq!(csv, "a,b,c\nd\n");
        assert_eq!(t.column_count(), 3);
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn test_empty_fields_survive_minimal_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cells.csv");
        let t = table(&[&[""], &["a", "", ""], &["", "b"]]);

        t.write_csv(&path, Quoting::Minimal).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\"\"\na,,\n,b\n");
        assert_eq!(Table::read_csv(&path).unwrap(), t);
    }

    #[test]
    fn test_display_pads_columns() {
        let t = table(&[&["id", "name"], &["10", "x"]]);
        assert_eq!(t.to_string(), "id | name\n10 | x\n");
    }
}
