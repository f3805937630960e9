//! Time-unit configuration for an [`crate::Stn`] instance.
//!
//! Every conversion between absolute/duration microseconds and STN units
//! routes through [`convert`], so a single place owns the unit and
//! level-of-detail semantics.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StnError;

/// The unit one STN distance value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Second,
    Millisecond,
    Microsecond,
}

impl Unit {
    fn micros_per_unit(self) -> i64 {
        match self {
            Unit::Second => 1_000_000,
            Unit::Millisecond => 1_000,
            Unit::Microsecond => 1,
        }
    }
}

impl FromStr for Unit {
    type Err = StnError;

    /// Case-insensitive parse of `"second"`/`"millisecond"`/`"microsecond"`,
    /// used to read [`Unit`] out of the `HTN_STN_UNIT` environment variable
    /// (see [`crate::config::StnConfig::from_env`]).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "second" | "seconds" | "s" => Ok(Unit::Second),
            "millisecond" | "milliseconds" | "ms" => Ok(Unit::Millisecond),
            "microsecond" | "microseconds" | "us" | "µs" => Ok(Unit::Microsecond),
            other => Err(StnError::MalformedIso(format!("unknown STN unit '{other}'"))),
        }
    }
}

/// Level-of-detail: the number of STN-unit subdivisions tracked per
/// [`Unit`]. An `Lod` of `1` means whole units; `10` means one decimal
/// place of resolution within a unit, and so on. Must be at least 1.
pub type Lod = u32;

/// Convert a signed microsecond quantity into STN distance units at the
/// given unit and level-of-detail.
///
/// `convert(µs, unit, lod)` is the single primitive all STN time math
/// routes through — both the duration-microsecond path (spec "Metadata &
/// Time Model") and the epoch-anchoring path (spec "Interval insertion")
/// call this rather than reimplementing the scaling.
pub fn convert(micros: i64, unit: Unit, lod: Lod) -> i64 {
    let lod = lod.max(1) as i64;
    let micros_per_subdivision = unit.micros_per_unit() / lod;
    if micros_per_subdivision <= 0 {
        // lod finer than a microsecond: scale up instead of dividing by zero.
        let subdivisions_per_micro = lod / unit.micros_per_unit().max(1);
        micros.saturating_mul(subdivisions_per_micro.max(1))
    } else {
        micros / micros_per_subdivision
    }
}
