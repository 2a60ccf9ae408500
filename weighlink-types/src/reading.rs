//! Normalized scale reading

use std::fmt;

use serde::{Deserialize, Serialize};

/// Weight unit reported by a scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Kg,
    G,
    Lb,
}

impl Unit {
    /// Map a unit suffix from the wire, case-insensitively.
    ///
    /// Anything other than `kg`, `g` or `lb` falls back to kilograms.
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix.to_ascii_lowercase().as_str() {
            "g" => Self::G,
            "lb" => Self::Lb,
            _ => Self::Kg,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::G => "g",
            Self::Lb => "lb",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded weight reading
///
/// Produced fresh by every successful parse and handed to the caller by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Weight in `unit`
    pub weight: f64,

    pub unit: Unit,

    /// Whether the scale reports the weight as settled
    pub stable: bool,

    /// Tare weight, when the device reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tare: Option<f64>,
}

impl Reading {
    pub fn new(weight: f64, unit: Unit, stable: bool) -> Self {
        Self {
            weight,
            unit,
            stable,
            tare: None,
        }
    }

    /// Reading in kilograms
    pub fn kg(weight: f64, stable: bool) -> Self {
        Self::new(weight, Unit::Kg, stable)
    }

    pub fn with_tare(mut self, tare: f64) -> Self {
        self.tare = Some(tare);
        self
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} {} ({})",
            self.weight,
            self.unit,
            if self.stable { "stable" } else { "unstable" }
        )
    }
}
