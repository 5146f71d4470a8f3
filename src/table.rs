//! Column-named, row-ordered tables parsed from the delimited result files.

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::error::{Error, Result};

/// Cell markers that read as "no value".
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Classifies a raw field the way the upstream files encode it.
    ///
    /// # Examples
    ///
    /// ```
    /// use autarky_viewer::table::Cell;
    ///
    /// assert_eq!(Cell::parse(" 2.5 "), Cell::Number(2.5));
    /// assert_eq!(Cell::parse("NA"), Cell::Missing);
    /// assert_eq!(Cell::parse("PV"), Cell::Text("PV".to_string()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if MISSING_MARKERS.contains(&s) {
            return Self::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_nan() => Self::Missing,
            Ok(v) => Self::Number(v),
            Err(_) => Self::Text(s.to_string()),
        }
    }

    /// Numeric value, if this cell holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => f.write_str("N/A"),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_nan() { Self::Missing } else { Self::Number(v) }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    cells: Vec<Cell>,
}

/// An ordered table of named columns.
///
/// Row order is the timestep order. Every column holds exactly
/// [`row_count`](Self::row_count) cells and column names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    name: String,
    columns: Vec<Column>,
    rows: usize,
}

impl TimeSeriesTable {
    /// Creates an empty table. `name` identifies the table in error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Starts a table built column by column.
    ///
    /// # Examples
    ///
    /// ```
    /// use autarky_viewer::table::TimeSeriesTable;
    ///
    /// let table = TimeSeriesTable::builder("sizing")
    ///     .with_column("Technology", ["Solar PV", "Battery"])
    ///     .with_column("Total Installed Capacity", [12.0, 50.0])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(table.row_count(), 2);
    ///
    /// let ragged = TimeSeriesTable::builder("ragged")
    ///     .with_column("a", [1.0, 2.0])
    ///     .with_column("b", [1.0])
    ///     .build();
    /// assert!(ragged.is_err());
    /// ```
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Reopens this table for adding or replacing columns.
    pub fn into_builder(self) -> TableBuilder {
        TableBuilder {
            name: self.name,
            columns: self.columns,
        }
    }

    /// Parses delimited text with a header row.
    ///
    /// Duplicate header names get a `.N` suffix so column identity stays
    /// unique.
    ///
    /// # Errors
    ///
    /// Returns the `csv` error if the input is malformed or a record has a
    /// different field count than the header.
    pub fn from_csv_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
    ) -> std::result::Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
        for header in &headers {
            let mut unique = header.to_string();
            let mut n = 1;
            while columns.iter().any(|c| c.name == unique) {
                unique = format!("{header}.{n}");
                n += 1;
            }
            columns.push(Column {
                name: unique,
                cells: Vec::new(),
            });
        }

        let mut rows = 0;
        for record in rdr.records() {
            let record = record?;
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                column.cells.push(Cell::parse(field));
            }
            rows += 1;
        }

        Ok(Self {
            name: name.into(),
            columns,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.cells.as_slice())
    }

    /// Looks up a column that the caller cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] naming the column and this table.
    pub fn require_column(&self, name: &str) -> Result<&[Cell]> {
        self.column(name)
            .ok_or_else(|| Error::missing_column(name, &self.name))
    }

    /// Columns in table order, each as a cell slice.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.cells.as_slice()))
    }

    /// Every cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.columns.iter().flat_map(|c| c.cells.iter())
    }

    /// Cell at (`row`, `column`).
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column(column).and_then(|cells| cells.get(row))
    }

    /// Rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows).map(move |index| Row { table: self, index })
    }
}

/// Column-by-column construction of a [`TimeSeriesTable`].
///
/// Column lengths are checked once, by [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
}

impl TableBuilder {
    /// Appends a column, replacing any existing column of the same name.
    pub fn with_column<C: Into<Cell>>(
        mut self,
        name: impl Into<String>,
        cells: impl IntoIterator<Item = C>,
    ) -> Self {
        let name = name.into();
        let cells: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.cells = cells,
            None => self.columns.push(Column { name, cells }),
        }
        self
    }

    /// Finishes the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnLength`] for the first column whose length
    /// differs from the first column's.
    pub fn build(self) -> Result<TimeSeriesTable> {
        let rows = self.columns.first().map_or(0, |c| c.cells.len());
        if let Some(column) = self.columns.iter().find(|c| c.cells.len() != rows) {
            return Err(Error::ColumnLength {
                column: column.name.clone(),
                table: self.name,
                expected: rows,
                found: column.cells.len(),
            });
        }
        Ok(TimeSeriesTable {
            name: self.name,
            columns: self.columns,
            rows,
        })
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a TimeSeriesTable,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table.get(self.index, column)
    }
}
