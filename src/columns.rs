//! Column names shared with the optimization model's output files.
//!
//! These literals are part of the file protocol and must match verbatim.

pub const SOLAR_PRODUCTION: &str = "Solar Production (kWh)";
pub const BATTERY_DISCHARGE: &str = "Battery Discharge (kWh)";
pub const BATTERY_CHARGE: &str = "Battery Charge (kWh)";
pub const GENERATOR_PRODUCTION: &str = "Generator Production (kWh)";
pub const GRID_IMPORT: &str = "Grid Import (kWh)";
pub const GRID_EXPORT: &str = "Grid Export (kWh)";
pub const LOST_LOAD: &str = "Lost Load (kWh)";
pub const LOAD_DEMAND: &str = "Load Demand (kWh)";
pub const BATTERY_RESERVE: &str = "Battery Reserve (kWh)";
pub const GENERATOR_RESERVE: &str = "Generator Reserve (kWh)";
pub const EXPECTED_SHORTFALL: &str = "Expected Shortfall (kWh)";

/// Any of these marks a dispatch produced under uncertainty.
pub const UNCERTAINTY_MARKERS: &[&str] = &[EXPECTED_SHORTFALL, BATTERY_RESERVE, GENERATOR_RESERVE];

pub const TECHNOLOGY: &str = "Technology";
pub const INSTALLED_UNITS: &str = "Installed Units";
pub const TOTAL_INSTALLED_CAPACITY: &str = "Total Installed Capacity";

pub const COST_COMPONENT: &str = "Cost Component";
pub const VALUE_KUSD: &str = "Value (kUSD)";

pub const INDICATOR: &str = "Indicator";
pub const VALUE: &str = "Value";
pub const UNIT: &str = "Unit";
