//! Single-project result summaries: sizing, costs, operational indicators.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::columns;
use crate::error::Result;
use crate::table::{Cell, TimeSeriesTable};

/// One technology of the sizing summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingRow {
    pub technology: Cell,
    pub installed_units: Option<f64>,
    pub total_installed_capacity: Option<f64>,
}

/// Reads `sizing_summary.csv` rows.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] without a `Technology` or
/// `Total Installed Capacity` column. `Installed Units` is optional.
pub fn sizing_summary(table: &TimeSeriesTable) -> Result<Vec<SizingRow>> {
    let technology = table.require_column(columns::TECHNOLOGY)?;
    let capacity = table.require_column(columns::TOTAL_INSTALLED_CAPACITY)?;
    let units = table.column(columns::INSTALLED_UNITS);

    Ok(technology
        .iter()
        .zip(capacity)
        .enumerate()
        .map(|(i, (tech, cap))| SizingRow {
            technology: tech.clone(),
            installed_units: units.and_then(|u| u.get(i)).and_then(Cell::as_f64),
            total_installed_capacity: cap.as_f64(),
        })
        .collect())
}

pub const NET_PRESENT_COST: &str = "Net Present Cost";
pub const TOTAL_CAPEX: &str = "Total Investment Cost (CAPEX)";
pub const TOTAL_REPLACEMENT: &str = "Total Discounted Replacement Cost";
pub const TOTAL_OPERATION: &str = "Total Discounted Operation Cost";
pub const TOTAL_SUBSIDIES: &str = "Total Subsidies (share of CAPEX)";
pub const TOTAL_SALVAGE: &str = "Total Discounted Salvage Value";

/// Headline figures of `costs_summary.csv` (kUSD unless noted).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostSummary {
    pub net_present_cost: f64,
    pub capex: f64,
    pub replacement: f64,
    pub operation: f64,
    /// Fraction of CAPEX covered by subsidies.
    pub subsidies: f64,
    pub salvage: f64,
}

/// Share of one key cost in the investment/replacement/operation total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostShare {
    pub label: &'static str,
    pub value: f64,
    pub share: f64,
}

impl CostSummary {
    /// Looks up the headline components; an absent component reads as 0.0.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] without `Cost Component` or
    /// `Value (kUSD)` columns.
    pub fn from_table(table: &TimeSeriesTable) -> Result<Self> {
        let components = table.require_column(columns::COST_COMPONENT)?;
        let values = table.require_column(columns::VALUE_KUSD)?;

        let cost = |label: &str| -> f64 {
            let Some(i) = components
                .iter()
                .position(|c| matches!(c, Cell::Text(s) if s == label))
            else {
                return 0.0;
            };
            values[i].as_f64().unwrap_or_else(|| {
                warn!(component = label, table = table.name(), "non-numeric cost value");
                0.0
            })
        };

        Ok(Self {
            net_present_cost: cost(NET_PRESENT_COST),
            capex: cost(TOTAL_CAPEX),
            replacement: cost(TOTAL_REPLACEMENT),
            operation: cost(TOTAL_OPERATION),
            subsidies: cost(TOTAL_SUBSIDIES),
            salvage: cost(TOTAL_SALVAGE),
        })
    }

    /// Investment, replacement and operation as fractions of their sum.
    ///
    /// Shares are all zero when the sum is zero.
    pub fn key_cost_shares(&self) -> [CostShare; 3] {
        let total = self.capex + self.replacement + self.operation;
        let share = |v: f64| if total != 0.0 { v / total } else { 0.0 };
        [
            CostShare {
                label: "Investment",
                value: self.capex,
                share: share(self.capex),
            },
            CostShare {
                label: "Replacement",
                value: self.replacement,
                share: share(self.replacement),
            },
            CostShare {
                label: "Operation",
                value: self.operation,
                share: share(self.operation),
            },
        ]
    }
}

impl fmt::Display for CostSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Cost Summary ---")?;
        writeln!(
            f,
            "Net Present Cost:      {} kUSD",
            group_thousands(self.net_present_cost, 2)
        )?;
        for s in self.key_cost_shares() {
            writeln!(
                f,
                "{:<22} {} kUSD ({:.1}%)",
                format!("{}:", s.label),
                group_thousands(s.value, 2),
                s.share * 100.0
            )?;
        }
        writeln!(f, "Subsidies:             {:.2}% of CAPEX", self.subsidies * 100.0)?;
        write!(f, "Salvage Value:         {} kUSD", group_thousands(self.salvage, 2))
    }
}

/// One operational indicator with its value rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub indicator: Cell,
    pub value: Cell,
    pub unit: Option<Cell>,
}

/// Reads `operation_indicators.csv` rows.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] without `Indicator` or `Value`.
pub fn indicators(table: &TimeSeriesTable) -> Result<Vec<IndicatorRow>> {
    let names = table.require_column(columns::INDICATOR)?;
    let values = table.require_column(columns::VALUE)?;
    let units = table.column(columns::UNIT);

    Ok(names
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (name, value))| IndicatorRow {
            indicator: name.clone(),
            value: match value {
                Cell::Number(v) => Cell::Number((v * 100.0).round() / 100.0),
                other => other.clone(),
            },
            unit: units.and_then(|u| u.get(i)).cloned(),
        })
        .collect())
}

/// Formats `v` with `decimals` fraction digits and `,` thousands separators.
pub(crate) fn group_thousands(v: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, v.abs());
    let (int, frac) = raw.split_once('.').unwrap_or((raw.as_str(), ""));
    let mut out = String::with_capacity(raw.len() + int.len() / 3 + 1);
    if v < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costs() -> TimeSeriesTable {
        TimeSeriesTable::builder("costs_summary.csv")
            .with_column(
                columns::COST_COMPONENT,
                [NET_PRESENT_COST, TOTAL_CAPEX, TOTAL_REPLACEMENT, TOTAL_OPERATION, TOTAL_SUBSIDIES],
            )
            .with_column(columns::VALUE_KUSD, [1500.0, 600.0, 150.0, 250.0, 0.2])
            .build()
            .expect("valid table")
    }

    #[test]
    fn cost_lookup_defaults_missing_components_to_zero() {
        let summary = CostSummary::from_table(&costs()).expect("valid");
        assert_eq!(summary.net_present_cost, 1500.0);
        assert_eq!(summary.subsidies, 0.2);
        assert_eq!(summary.salvage, 0.0);
    }

    #[test]
    fn key_cost_shares_sum_to_one() {
        let summary = CostSummary::from_table(&costs()).expect("valid");
        let shares = summary.key_cost_shares();
        let total: f64 = shares.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(shares[0].label, "Investment");
        assert!((shares[0].share - 0.6).abs() < 1e-12);
    }

    #[test]
    fn zero_costs_give_zero_shares() {
        let table = TimeSeriesTable::builder("c")
            .with_column(columns::COST_COMPONENT, [NET_PRESENT_COST])
            .with_column(columns::VALUE_KUSD, [0.0])
            .build()
            .expect("valid table");
        let summary = CostSummary::from_table(&table).expect("valid");
        assert!(summary.key_cost_shares().iter().all(|s| s.share == 0.0));
    }

    #[test]
    fn cost_display_mentions_npc() {
        let summary = CostSummary::from_table(&costs()).expect("valid");
        let text = summary.to_string();
        assert!(text.contains("Net Present Cost:      1,500.00 kUSD"));
        assert!(text.contains("20.00% of CAPEX"));
    }

    #[test]
    fn sizing_rows_tolerate_missing_units_column() {
        let table = TimeSeriesTable::builder("sizing")
            .with_column(columns::TECHNOLOGY, ["Solar PV", "Battery"])
            .with_column(columns::TOTAL_INSTALLED_CAPACITY, [Some(12.5), None])
            .build()
            .expect("valid table");
        let rows = sizing_summary(&table).expect("valid");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].installed_units, None);
        assert_eq!(rows[0].total_installed_capacity, Some(12.5));
        assert_eq!(rows[1].total_installed_capacity, None);
    }

    #[test]
    fn indicator_values_round_to_two_decimals() {
        let table = TimeSeriesTable::builder("ind")
            .with_column(columns::INDICATOR, ["Renewable Penetration"])
            .with_column(columns::VALUE, [87.456])
            .with_column(columns::UNIT, ["%"])
            .build()
            .expect("valid table");
        let rows = indicators(&table).expect("valid");
        assert_eq!(rows[0].value, Cell::Number(87.46));
        assert_eq!(rows[0].unit, Some(Cell::Text("%".into())));
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0.0, 0), "0");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1234567.0, 0), "1,234,567");
        assert_eq!(group_thousands(-1000.0, 2), "-1,000.00");
        assert_eq!(group_thousands(250000.0, 0), "250,000");
    }
}
