//! Colors and fill patterns handed to the rendering layer.
//!
//! The analytic components only emit color and pattern identities; a
//! renderer resolves them through a [`Palette`] value.

use serde::{Deserialize, Serialize};

use crate::compare::MismatchClass;
use crate::flow::{BandColor, FillPattern};

pub const SOLAR: &str = "#FFD700";
pub const BATTERY: &str = "#ADD8E6";
pub const GENERATOR: &str = "#00008B";
pub const GRID: &str = "#800080";
pub const LOST_LOAD: &str = "#FF0000";
pub const LOAD: &str = "#000000";
/// Row highlight for values further apart than the tolerance.
pub const NUMERIC_MISMATCH: &str = "#FFF9C4";
/// Row highlight for absent or non-numeric operands.
pub const NOT_COMPARABLE: &str = "#FFE0B2";

/// Resolves band and mismatch identities to concrete styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub solar: String,
    pub battery: String,
    pub generator: String,
    pub grid: String,
    pub lost_load: String,
    pub load: String,
    /// Hatch used for battery reserve bars.
    pub forward_hatch: String,
    /// Hatch used for generator reserve bars.
    pub back_hatch: String,
    pub numeric_mismatch: String,
    pub missing_operand: String,
    pub incomparable_types: String,
    /// Opacity of stacked fills (0.0-1.0).
    pub band_alpha: f32,
    /// Opacity of reserve bars (0.0-1.0).
    pub reserve_alpha: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            solar: SOLAR.to_string(),
            battery: BATTERY.to_string(),
            generator: GENERATOR.to_string(),
            grid: GRID.to_string(),
            lost_load: LOST_LOAD.to_string(),
            load: LOAD.to_string(),
            forward_hatch: "///".to_string(),
            back_hatch: "\\\\\\".to_string(),
            numeric_mismatch: NUMERIC_MISMATCH.to_string(),
            missing_operand: NOT_COMPARABLE.to_string(),
            incomparable_types: NOT_COMPARABLE.to_string(),
            band_alpha: 0.5,
            reserve_alpha: 0.6,
        }
    }
}

impl Palette {
    pub fn band_color(&self, color: BandColor) -> &str {
        match color {
            BandColor::Solar => &self.solar,
            BandColor::Battery => &self.battery,
            BandColor::Generator => &self.generator,
            BandColor::Grid => &self.grid,
            BandColor::LostLoad => &self.lost_load,
            BandColor::Load => &self.load,
        }
    }

    pub fn pattern(&self, pattern: FillPattern) -> &str {
        match pattern {
            FillPattern::ForwardHatch => &self.forward_hatch,
            FillPattern::BackHatch => &self.back_hatch,
        }
    }

    /// Row background for a comparison outcome; matches are not highlighted.
    pub fn highlight(&self, class: MismatchClass) -> Option<&str> {
        match class {
            MismatchClass::Match => None,
            MismatchClass::NumericMismatch => Some(self.numeric_mismatch.as_str()),
            MismatchClass::MissingOperand => Some(self.missing_operand.as_str()),
            MismatchClass::IncomparableTypes => Some(self.incomparable_types.as_str()),
        }
    }

    /// Color fields as `(name, value)` pairs, for validation.
    pub(crate) fn colors(&self) -> [(&'static str, &str); 9] {
        [
            ("solar", self.solar.as_str()),
            ("battery", self.battery.as_str()),
            ("generator", self.generator.as_str()),
            ("grid", self.grid.as_str()),
            ("lost_load", self.lost_load.as_str()),
            ("load", self.load.as_str()),
            ("numeric_mismatch", self.numeric_mismatch.as_str()),
            ("missing_operand", self.missing_operand.as_str()),
            ("incomparable_types", self.incomparable_types.as_str()),
        ]
    }
}

/// True for `#RRGGBB`.
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_bands_and_reserve_share_color() {
        let p = Palette::default();
        assert_eq!(p.band_color(BandColor::Battery), BATTERY);
        assert_eq!(p.band_color(BandColor::Grid), GRID);
    }

    #[test]
    fn reserve_patterns_differ() {
        let p = Palette::default();
        assert_ne!(
            p.pattern(FillPattern::ForwardHatch),
            p.pattern(FillPattern::BackHatch)
        );
    }

    #[test]
    fn only_non_matches_are_highlighted() {
        let p = Palette::default();
        assert_eq!(p.highlight(MismatchClass::Match), None);
        assert_eq!(p.highlight(MismatchClass::NumericMismatch), Some(NUMERIC_MISMATCH));
        assert_eq!(p.highlight(MismatchClass::MissingOperand), Some(NOT_COMPARABLE));
    }

    #[test]
    fn default_colors_are_hex() {
        let p = Palette::default();
        assert!(p.colors().iter().all(|(_, c)| is_hex_color(c)));
        assert!(!is_hex_color("gold"));
        assert!(!is_hex_color("#12345G"));
    }
}
