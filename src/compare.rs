//! Tolerance-aware comparison of two projects' summary tables.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns;
use crate::error::{Error, Result};
use crate::table::{Cell, TimeSeriesTable};

/// Absolute tolerance used when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Outcome of comparing one pair of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchClass {
    /// Both numeric and within tolerance.
    Match,
    /// Both numeric and further apart than the tolerance.
    NumericMismatch,
    /// At least one side has no value.
    MissingOperand,
    /// At least one side is not a number.
    IncomparableTypes,
}

impl MismatchClass {
    pub fn label(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::NumericMismatch => "numeric-mismatch",
            Self::MissingOperand => "missing-operand",
            Self::IncomparableTypes => "incomparable-types",
        }
    }
}

impl fmt::Display for MismatchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a value pair. Depends on nothing but its arguments.
///
/// # Examples
///
/// ```
/// use autarky_viewer::compare::{classify, MismatchClass};
/// use autarky_viewer::table::Cell;
///
/// let a = Cell::Number(10.0);
/// let b = Cell::Number(10.000001);
/// assert_eq!(classify(&a, &b, 1e-5), MismatchClass::Match);
/// assert_eq!(classify(&a, &b, 1e-7), MismatchClass::NumericMismatch);
/// assert_eq!(classify(&a, &Cell::Missing, 1e-5), MismatchClass::MissingOperand);
/// ```
pub fn classify(a: &Cell, b: &Cell, tolerance: f64) -> MismatchClass {
    if a.is_missing() || b.is_missing() {
        return MismatchClass::MissingOperand;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if x == y || (x - y).abs() <= tolerance => MismatchClass::Match,
        (Some(_), Some(_)) => MismatchClass::NumericMismatch,
        _ => MismatchClass::IncomparableTypes,
    }
}

/// Which keys survive the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Every key from either side.
    #[default]
    Outer,
    /// Only keys present on both sides.
    Inner,
}

/// One joined row of a two-project comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRow {
    pub key: Cell,
    pub value_a: Cell,
    pub value_b: Cell,
    pub class: MismatchClass,
    /// The key occurred more than once on at least one side; the last
    /// occurrence supplied the value.
    pub duplicate_key: bool,
    /// Carried descriptive column (e.g. the indicator unit), A before B.
    pub annotation: Option<Cell>,
}

/// Parameters of one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSpec {
    pub title: &'static str,
    pub key_column: String,
    pub value_column_a: String,
    pub value_column_b: String,
    pub join: JoinKind,
    pub carry_column: Option<String>,
    pub tolerance: f64,
}

impl ComparisonSpec {
    /// Same-named key and value columns on both sides, outer join.
    pub fn new(title: &'static str, key_column: &str, value_column: &str) -> Self {
        Self {
            title,
            key_column: key_column.to_string(),
            value_column_a: value_column.to_string(),
            value_column_b: value_column.to_string(),
            join: JoinKind::Outer,
            carry_column: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Installed capacity per technology.
    pub fn sizing() -> Self {
        Self::new(
            "Total Installed Capacity",
            columns::TECHNOLOGY,
            columns::TOTAL_INSTALLED_CAPACITY,
        )
    }

    /// Cost components listed by both projects.
    pub fn costs() -> Self {
        Self {
            join: JoinKind::Inner,
            ..Self::new("Cost Summary", columns::COST_COMPONENT, columns::VALUE_KUSD)
        }
    }

    /// Operational indicators with their unit.
    pub fn indicators() -> Self {
        Self {
            carry_column: Some(columns::UNIT.to_string()),
            ..Self::new(
                "Operational Performance Indicators",
                columns::INDICATOR,
                columns::VALUE,
            )
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Compares two tables with a full outer join on `key_column`.
///
/// Rows come out in join order: keys of `table_a` as first seen, then keys
/// only present in `table_b` as first seen.
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] if a key or value column is absent and
/// [`Error::InvalidTolerance`] for a negative or non-finite tolerance.
pub fn compare(
    table_a: &TimeSeriesTable,
    table_b: &TimeSeriesTable,
    key_column: &str,
    value_column_a: &str,
    value_column_b: &str,
    tolerance: f64,
) -> Result<Vec<DiffRow>> {
    let spec = ComparisonSpec {
        title: "",
        key_column: key_column.to_string(),
        value_column_a: value_column_a.to_string(),
        value_column_b: value_column_b.to_string(),
        join: JoinKind::Outer,
        carry_column: None,
        tolerance,
    };
    compare_with(table_a, table_b, &spec)
}

/// Compares two tables as described by `spec`.
///
/// # Errors
///
/// See [`compare`].
pub fn compare_with(
    table_a: &TimeSeriesTable,
    table_b: &TimeSeriesTable,
    spec: &ComparisonSpec,
) -> Result<Vec<DiffRow>> {
    if !spec.tolerance.is_finite() || spec.tolerance < 0.0 {
        return Err(Error::InvalidTolerance(spec.tolerance));
    }

    let side_a = Side::index(table_a, &spec.key_column, &spec.value_column_a, spec)?;
    let side_b = Side::index(table_b, &spec.key_column, &spec.value_column_b, spec)?;

    let mut order: Vec<&str> = side_a.order.iter().map(String::as_str).collect();
    match spec.join {
        JoinKind::Outer => order.extend(
            side_b
                .order
                .iter()
                .map(String::as_str)
                .filter(|k| !side_a.entries.contains_key(*k)),
        ),
        JoinKind::Inner => order.retain(|k| side_b.entries.contains_key(*k)),
    }

    let rows: Vec<DiffRow> = order
        .into_iter()
        .map(|k| {
            let a = side_a.entries.get(k);
            let b = side_b.entries.get(k);
            let key = a.or(b).map_or(Cell::Missing, |e| e.key.clone());
            let value_a = a.map_or(Cell::Missing, |e| e.value.clone());
            let value_b = b.map_or(Cell::Missing, |e| e.value.clone());
            let annotation = a
                .and_then(|e| e.annotation.clone())
                .or_else(|| b.and_then(|e| e.annotation.clone()));
            DiffRow {
                class: classify(&value_a, &value_b, spec.tolerance),
                duplicate_key: a.is_some_and(|e| e.seen > 1) || b.is_some_and(|e| e.seen > 1),
                key,
                value_a,
                value_b,
                annotation,
            }
        })
        .collect();

    debug!(
        key = %spec.key_column,
        rows_a = table_a.row_count(),
        rows_b = table_b.row_count(),
        joined = rows.len(),
        "compared tables"
    );
    Ok(rows)
}

struct Entry {
    key: Cell,
    value: Cell,
    annotation: Option<Cell>,
    seen: usize,
}

/// One side of the join, keyed by the key cell's text form.
struct Side {
    order: Vec<String>,
    entries: HashMap<String, Entry>,
}

impl Side {
    fn index(
        table: &TimeSeriesTable,
        key_column: &str,
        value_column: &str,
        spec: &ComparisonSpec,
    ) -> Result<Self> {
        let keys = table.require_column(key_column)?;
        let values = table.require_column(value_column)?;
        let carried = spec.carry_column.as_deref().and_then(|c| table.column(c));

        let mut side = Self {
            order: Vec::new(),
            entries: HashMap::new(),
        };
        for (i, (key, value)) in keys.iter().zip(values).enumerate() {
            let id = key.to_string();
            let annotation = carried.and_then(|c| c.get(i)).cloned();
            match side.entries.get_mut(&id) {
                Some(entry) => {
                    entry.value = value.clone();
                    entry.annotation = annotation;
                    entry.seen += 1;
                }
                None => {
                    side.order.push(id.clone());
                    side.entries.insert(
                        id,
                        Entry {
                            key: key.clone(),
                            value: value.clone(),
                            annotation,
                            seen: 1,
                        },
                    );
                }
            }
        }
        Ok(side)
    }
}

/// Count of rows per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub matches: usize,
    pub numeric_mismatches: usize,
    pub missing_operands: usize,
    pub incomparable: usize,
}

impl DiffSummary {
    pub fn from_rows(rows: &[DiffRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            match row.class {
                MismatchClass::Match => summary.matches += 1,
                MismatchClass::NumericMismatch => summary.numeric_mismatches += 1,
                MismatchClass::MissingOperand => summary.missing_operands += 1,
                MismatchClass::IncomparableTypes => summary.incomparable += 1,
            }
        }
        summary
    }

    /// True when every row matched.
    pub fn is_identical(&self) -> bool {
        self.numeric_mismatches == 0 && self.missing_operands == 0 && self.incomparable == 0
    }
}

/// Result of one preset comparison between two projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSection {
    pub title: &'static str,
    /// `None` when either project lacks the source file.
    pub rows: Option<Vec<DiffRow>>,
}

impl ComparisonSection {
    pub fn is_available(&self) -> bool {
        self.rows.is_some()
    }

    pub fn summary(&self) -> Option<DiffSummary> {
        self.rows.as_deref().map(DiffSummary::from_rows)
    }
}
