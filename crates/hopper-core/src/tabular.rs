//! In-memory tabular data parsed from an uploaded file.

use serde::Serialize;

use crate::CoreError;

/// Raw bytes of a user-selected file.
///
/// "No file chosen yet" is modelled as `Option<FileUpload>::None` by callers,
/// which keeps it distinct from a chosen file that happens to be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name as supplied by the user (used to detect `.gz`).
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// True when the file has no content besides whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(u8::is_ascii_whitespace)
    }
}

/// Ordered named columns plus ordered rows of raw values.
///
/// Every row has exactly one value per column; `None` is a null (an empty
/// field in the source file). Values stay untyped: conversion to the
/// destination column types is the warehouse's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularFile {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl TabularFile {
    /// Build a table, checking that every row is as wide as the header.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] naming the first row (1-based) whose
    /// width differs from the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self, CoreError> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(CoreError::Validation(format!(
                "row {} has {} values but the header has {} columns",
                index + 1,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name-addressable view of row `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|values| RowView {
            columns: &self.columns,
            values,
        })
    }

    /// Rows in file order, each as a [`RowView`].
    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|values| RowView {
            columns: &self.columns,
            values,
        })
    }
}

/// One row of a [`TabularFile`] seen as a column-name → value mapping.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    values: &'a [Option<String>],
}

impl<'a> RowView<'a> {
    /// Value of `column`: `None` if the column does not exist,
    /// `Some(None)` if the cell is null.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<Option<&'a str>> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| self.values[index].as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Option<&'a str>)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_deref))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn sample() -> TabularFile {
        TabularFile::new(
            vec!["NAME".into(), "SALARY".into()],
            vec![
                vec![Some("ada".into()), Some("100".into())],
                vec![Some("bob".into()), None],
            ],
        )
        .expect("valid table")
    }

    #[test]
    fn row_count_is_derived_from_rows() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn row_view_maps_names_to_values() {
        let table = sample();
        let row = table.row(1).expect("second row");
        assert_eq!(row.get("NAME"), Some(Some("bob")));
        assert_eq!(row.get("SALARY"), Some(None));
        assert_eq!(row.get("MISSING"), None);
        assert_eq!(
            row.iter().collect::<Vec<_>>(),
            vec![("NAME", Some("bob")), ("SALARY", None)]
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TabularFile::new(
            vec!["A".into(), "B".into()],
            vec![vec![Some("1".into()), Some("2".into())], vec![Some("3".into())]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 2 has 1 values"));
    }

    #[rstest]
    #[case(b"", true)]
    #[case(b" \n\t\r\n", true)]
    #[case(b"A,B\n", false)]
    fn blank_detection(#[case] bytes: &[u8], #[case] blank: bool) {
        assert_eq!(FileUpload::new("f.csv", bytes).is_blank(), blank);
    }
}
