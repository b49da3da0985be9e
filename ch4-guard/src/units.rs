//! Concentration units and the single conversion point to parts-per-billion.
//!
//! Providers report methane in whatever unit their product uses. Values are
//! converted exactly once, when an observation becomes a
//! [`Measurement`](crate::model::Measurement); everything downstream of that
//! (baselines, scores, the alert log, reports) is in ppb.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// Unit a raw concentration value is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcentrationUnit {
    /// Parts per billion (the canonical unit).
    #[default]
    Ppb,
    /// Parts per million.
    Ppm,
    /// Dimensionless mole fraction (mol/mol).
    MoleFraction,
}

impl ConcentrationUnit {
    /// Multiplier taking a value in this unit to ppb.
    pub fn ppb_factor(self) -> f64 {
        match self {
            Self::Ppb => 1.0,
            Self::Ppm => 1_000.0,
            Self::MoleFraction => 1_000_000_000.0,
        }
    }

    /// Converts `value` in this unit to ppb.
    ///
    /// Non-finite input is rejected rather than propagated.
    pub fn to_ppb(self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(GuardError::invalid_measurement(format!(
                "concentration must be finite, got {value} {self}"
            )));
        }
        let ppb = value * self.ppb_factor();
        if !ppb.is_finite() {
            return Err(GuardError::invalid_measurement(format!(
                "{value} {self} overflows when converted to ppb"
            )));
        }
        Ok(ppb)
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ppb => write!(f, "ppb"),
            Self::Ppm => write!(f, "ppm"),
            Self::MoleFraction => write!(f, "mol/mol"),
        }
    }
}

impl FromStr for ConcentrationUnit {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ppb" => Ok(Self::Ppb),
            "ppm" => Ok(Self::Ppm),
            "mol/mol" | "mol-fraction" | "mole-fraction" => Ok(Self::MoleFraction),
            other => Err(GuardError::Parse(format!(
                "unknown concentration unit '{other}' (expected ppb, ppm or mol-fraction)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_factors() {
        assert_eq!(ConcentrationUnit::Ppb.to_ppb(1875.2).unwrap(), 1875.2);
        assert!((ConcentrationUnit::Ppm.to_ppb(1.8752).unwrap() - 1875.2).abs() < 1e-9);
        assert!(
            (ConcentrationUnit::MoleFraction.to_ppb(1.8752e-6).unwrap() - 1875.2).abs() < 1e-6
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = ConcentrationUnit::Ppm.to_ppb(f64::NAN).unwrap_err();
        assert!(matches!(err, GuardError::InvalidMeasurement(_)));
        assert!(ConcentrationUnit::MoleFraction.to_ppb(1e300).is_err());
    }

    #[test]
    fn test_parse_roundtrip_names() {
        assert_eq!("PPB".parse::<ConcentrationUnit>().unwrap(), ConcentrationUnit::Ppb);
        assert_eq!("ppm".parse::<ConcentrationUnit>().unwrap(), ConcentrationUnit::Ppm);
        assert_eq!(
            "mol/mol".parse::<ConcentrationUnit>().unwrap(),
            ConcentrationUnit::MoleFraction
        );
        assert!("percent".parse::<ConcentrationUnit>().is_err());
    }
}
