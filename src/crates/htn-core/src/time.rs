//! Metadata & Time Model: ISO-8601 conversions (delegated to `htn-stn`,
//! which owns the parser so both crates share one implementation) plus the
//! `PlannerMetadata` bundle attached to methods, actions, and nodes.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Re-exported so callers need only depend on `htn-core` for the common
/// case; `htn-stn` remains independently usable for STN-only callers.
pub use htn_stn::{from_micros_abs, from_micros_dur, to_micros_abs, to_micros_dur};

pub fn parse_abs(iso: &str) -> Result<i64> {
    to_micros_abs(iso).map_err(|e| PlannerError::MalformedMetadata(e.to_string()))
}

pub fn parse_dur(iso: &str) -> Result<i64> {
    to_micros_dur(iso).map_err(|e| PlannerError::MalformedMetadata(e.to_string()))
}

/// `(entity type, required capabilities)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRequirement {
    pub entity_type: String,
    pub capabilities: Vec<String>,
}

/// Metadata attached to methods, actions, and the nodes they produce:
/// duration, optional start/end time, and entity requirements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerMetadata {
    /// ISO-8601 duration, e.g. `"PT2H30M"`.
    pub duration: Option<String>,
    /// ISO-8601 absolute datetime.
    pub start_time: Option<String>,
    /// ISO-8601 absolute datetime.
    pub end_time: Option<String>,
    pub entity_requirements: Vec<EntityRequirement>,
}

impl PlannerMetadata {
    /// Merge two metadata bundles whose time intervals may overlap: the
    /// result's interval is the union `[min(start), max(end)]`; `other`'s
    /// duration wins ties.
    pub fn merge(&self, other: &PlannerMetadata) -> Result<PlannerMetadata> {
        let start_time = merge_extreme(&self.start_time, &other.start_time, true)?;
        let end_time = merge_extreme(&self.end_time, &other.end_time, false)?;

        let mut entity_requirements = self.entity_requirements.clone();
        entity_requirements.extend(other.entity_requirements.iter().cloned());

        Ok(PlannerMetadata {
            duration: other.duration.clone().or_else(|| self.duration.clone()),
            start_time,
            end_time,
            entity_requirements,
        })
    }
}

/// Pick the min (`want_min = true`) or max of two optional ISO-8601
/// absolute datetimes, comparing by their microsecond value.
fn merge_extreme(
    a: &Option<String>,
    b: &Option<String>,
    want_min: bool,
) -> Result<Option<String>> {
    match (a, b) {
        (None, None) => Ok(None),
        (Some(x), None) => Ok(Some(x.clone())),
        (None, Some(y)) => Ok(Some(y.clone())),
        (Some(x), Some(y)) => {
            let xm = parse_abs(x)?;
            let ym = parse_abs(y)?;
            let pick_x = if want_min { xm <= ym } else { xm >= ym };
            Ok(Some(if pick_x { x.clone() } else { y.clone() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_union_interval_and_overriding_duration() {
        let a = PlannerMetadata {
            duration: Some("PT1H".to_string()),
            start_time: Some("2025-01-01T10:00:00Z".to_string()),
            end_time: Some("2025-01-01T11:00:00Z".to_string()),
            entity_requirements: vec![],
        };
        let b = PlannerMetadata {
            duration: Some("PT2H".to_string()),
            start_time: Some("2025-01-01T09:00:00Z".to_string()),
            end_time: Some("2025-01-01T12:00:00Z".to_string()),
            entity_requirements: vec![],
        };
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.duration.as_deref(), Some("PT2H"));
        assert_eq!(merged.start_time.as_deref(), Some("2025-01-01T09:00:00Z"));
        assert_eq!(merged.end_time.as_deref(), Some("2025-01-01T12:00:00Z"));
    }

    #[test]
    fn round_trip_properties_p9() {
        for micros in [0_i64, 1, -1, 1_700_000_000_000_000, -1_700_000_000_000_000] {
            let iso = from_micros_abs(micros).unwrap();
            assert_eq!(to_micros_abs(&iso).unwrap(), micros);
        }
        for micros in [0_i64, 1_000_000, 3_661_000_000] {
            let iso = from_micros_dur(micros).unwrap();
            assert_eq!(to_micros_dur(&iso).unwrap(), micros);
        }
    }
}
