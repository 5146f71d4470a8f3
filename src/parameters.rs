//! Typed, lenient view over a project's `parameters.yaml`.
//!
//! The file is written by the optimization model and carries far more
//! than the viewer needs; unknown keys are ignored and every field is
//! optional. Scalars stay as YAML values so a wrongly typed entry renders
//! as `N/A` instead of failing the whole file.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::metrics::ErrorFamily;
use crate::summary::group_thousands;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectParameters {
    pub project_settings: ProjectSettings,
    pub time_series_settings: TimeSeriesSettings,
    pub optimization_settings: OptimizationSettings,
    pub uncertainty_settings: Option<Mapping>,
    pub solar_pv: RenewableSettings,
    pub wind_turbine: RenewableSettings,
    pub battery: StorageSettings,
    pub generator: GeneratorSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub start_date: Option<Value>,
    pub project_lifetime: Option<Value>,
    pub time_step_duration: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimeSeriesSettings {
    pub data_type: Option<Value>,
    pub seasonality: Option<Value>,
    pub num_seasons: Option<Value>,
    pub seasonal_definition: Option<Mapping>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptimizationSettings {
    pub max_lost_load_share: Option<Value>,
    pub max_capex: Option<Value>,
    pub min_res_share: Option<Value>,
    pub on_grid: GridSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub allow_grid_connection: Option<Value>,
    pub allow_grid_export: Option<Value>,
    pub max_capacity: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TechnicalSettings {
    pub nominal_capacity: Option<Value>,
}

/// Solar PV and wind turbine blocks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenewableSettings {
    pub enabled: Option<Value>,
    pub allow_units: Option<Value>,
    pub technical: TechnicalSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub enabled: Option<Value>,
    pub allow_units: Option<Value>,
    pub nominal_capacity: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FuelSettings {
    pub fuel_consumption_limit: Option<Value>,
    pub max_fuel_consumption: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub enabled: Option<Value>,
    pub allow_units: Option<Value>,
    pub nominal_capacity: Option<Value>,
    pub allow_partial_load: Option<Value>,
    pub fuel: FuelSettings,
}

/// A formatted optimization constraint value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ConstraintValue {
    /// Fraction rendered as a percentage.
    Percent(f64),
    Dollars(f64),
    Hours(f64),
    NotAvailable,
}

impl fmt::Display for ConstraintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(v) => write!(f, "{:.2}%", v * 100.0),
            Self::Dollars(v) => write!(f, "${}", group_thousands(*v, 0)),
            Self::Hours(v) => write!(f, "{v} h"),
            Self::NotAvailable => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    pub name: &'static str,
    pub value: ConstraintValue,
}

/// One line of detail under an enabled component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDetail {
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub details: Vec<ComponentDetail>,
}

impl ProjectParameters {
    /// Parses the YAML text of a parameters file.
    ///
    /// # Errors
    ///
    /// Returns the `serde_yaml` error for malformed YAML or a top-level
    /// section of the wrong shape.
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(s)
    }

    /// `(latitude, longitude)` when both are numeric.
    pub fn location(&self) -> Option<(f64, f64)> {
        let p = &self.project_settings;
        Some((number(&p.latitude)?, number(&p.longitude)?))
    }

    /// True when uncertainty settings are present and non-empty.
    pub fn has_uncertainty(&self) -> bool {
        self.uncertainty_settings
            .as_ref()
            .is_some_and(|m| !m.is_empty())
    }

    pub fn solar_enabled(&self) -> bool {
        flag(&self.solar_pv.enabled)
    }

    pub fn wind_enabled(&self) -> bool {
        flag(&self.wind_turbine.enabled)
    }

    pub fn grid_enabled(&self) -> bool {
        flag(&self.optimization_settings.on_grid.allow_grid_connection)
    }

    /// Forecast error families with data to report: load and solar, plus
    /// wind when the turbine is enabled. Empty without uncertainty settings.
    pub fn error_families(&self) -> Vec<ErrorFamily> {
        if !self.has_uncertainty() {
            return Vec::new();
        }
        let mut families = vec![ErrorFamily::Load, ErrorFamily::Solar];
        if self.wind_enabled() {
            families.push(ErrorFamily::Wind);
        }
        families
    }

    /// Optimization constraints, with outage settings when present.
    pub fn constraints(&self) -> Vec<Constraint> {
        let o = &self.optimization_settings;
        let mut out = vec![
            Constraint {
                name: "Maximum Lost Load Share",
                value: percent(&o.max_lost_load_share),
            },
            Constraint {
                name: "Maximum CAPEX",
                value: number(&o.max_capex)
                    .map_or(ConstraintValue::NotAvailable, ConstraintValue::Dollars),
            },
            Constraint {
                name: "Minimum Renewable Penetration",
                value: percent(&o.min_res_share),
            },
        ];

        if let Some(u) = &self.uncertainty_settings {
            if let Some(v) = u.get("outage_duration") {
                out.push(Constraint {
                    name: "Average Daily Outage Duration",
                    value: v
                        .as_f64()
                        .map_or(ConstraintValue::NotAvailable, ConstraintValue::Hours),
                });
            }
            if let Some(v) = u.get("outage_probability") {
                out.push(Constraint {
                    name: "Probability of Daily Outage",
                    value: v
                        .as_f64()
                        .map_or(ConstraintValue::NotAvailable, ConstraintValue::Percent),
                });
            }
            if let Some(v) = u.get("islanding_probability") {
                out.push(Constraint {
                    name: "Probability of Successful Islanding",
                    value: v
                        .as_f64()
                        .map_or(ConstraintValue::NotAvailable, ConstraintValue::Percent),
                });
            }
        }
        out
    }

    /// Status of every system component, with details for enabled ones.
    pub fn components(&self) -> Vec<ComponentStatus> {
        let solar = &self.solar_pv;
        let wind = &self.wind_turbine;
        let bat = &self.battery;
        let generator = &self.generator;
        let grid = &self.optimization_settings.on_grid;

        let mut generator_details = vec![
            detail("Unit Commitment", text_or(&generator.allow_units, "false"), ""),
            detail("Nominal Capacity", text(&generator.nominal_capacity), "kW"),
            detail("Partial Load Enabled", text_or(&generator.allow_partial_load, "false"), ""),
        ];
        if flag(&generator.fuel.fuel_consumption_limit) {
            generator_details.push(detail(
                "Max Fuel Consumption",
                text(&generator.fuel.max_fuel_consumption),
                "liters/year",
            ));
        }

        [
            (
                "Solar PV",
                flag(&solar.enabled),
                vec![
                    detail("Unit Commitment", text_or(&solar.allow_units, "false"), ""),
                    detail("Nominal Capacity", text(&solar.technical.nominal_capacity), "kW"),
                ],
            ),
            (
                "Wind Turbine",
                flag(&wind.enabled),
                vec![
                    detail("Unit Commitment", text_or(&wind.allow_units, "false"), ""),
                    detail("Nominal Capacity", text(&wind.technical.nominal_capacity), "kW"),
                ],
            ),
            (
                "Battery",
                flag(&bat.enabled),
                vec![
                    detail("Unit Commitment", text_or(&bat.allow_units, "false"), ""),
                    detail("Nominal Capacity", text(&bat.nominal_capacity), "kWh"),
                ],
            ),
            ("Backup Generator", flag(&generator.enabled), generator_details),
            (
                "Grid Connection",
                flag(&grid.allow_grid_connection),
                vec![
                    detail("Grid Export Allowed", text_or(&grid.allow_grid_export, "false"), ""),
                    detail("Max Grid Capacity", text(&grid.max_capacity), "kW"),
                ],
            ),
        ]
        .into_iter()
        .map(|(name, enabled, details)| ComponentStatus {
            name,
            enabled,
            details: if enabled { details } else { Vec::new() },
        })
        .collect()
    }

    /// `(season, months)` pairs of the seasonal definition, in file order.
    pub fn seasonal_definition(&self) -> Vec<(String, String)> {
        self.time_series_settings
            .seasonal_definition
            .iter()
            .flatten()
            .map(|(k, v)| (display(Some(k)), display(Some(v))))
            .collect()
    }
}

fn detail(label: &'static str, value: String, unit: &'static str) -> ComponentDetail {
    ComponentDetail { label, value, unit }
}

fn number(v: &Option<Value>) -> Option<f64> {
    v.as_ref().and_then(Value::as_f64)
}

fn percent(v: &Option<Value>) -> ConstraintValue {
    number(v).map_or(ConstraintValue::NotAvailable, ConstraintValue::Percent)
}

fn flag(v: &Option<Value>) -> bool {
    v.as_ref().and_then(Value::as_bool).unwrap_or(false)
}

/// Renders a scalar for display, `N/A` when absent.
pub fn text(v: &Option<Value>) -> String {
    display(v.as_ref())
}

fn text_or(v: &Option<Value>, default: &str) -> String {
    match v {
        Some(Value::Null) | None => default.to_string(),
        Some(other) => display(Some(other)),
    }
}

fn display(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Sequence(items)) => {
            let parts: Vec<String> = items.iter().map(|i| display(Some(i))).collect();
            format!("[{}]", parts.join(", "))
        }
        Some(other) => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "N/A".to_string()),
    }
}
