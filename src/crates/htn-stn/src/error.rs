use thiserror::Error;

/// Errors raised by the STN subsystem.
///
/// Per the planner's propagation policy, STN inconsistency itself is
/// *not* an error — it is surfaced via [`crate::Stn::is_consistent`] and
/// left for the caller to act on. These variants are strictly malformed
/// *input* failures: a caller asked to add an interval whose bounds are
/// contradictory on their face, or supplied a time string the parser
/// cannot handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StnError {
    /// `lo > hi` under the bound lattice — the interval is empty before any
    /// intersection with existing constraints is even attempted.
    #[error("invalid interval: lo {lo:?} is greater than hi {hi:?}")]
    InvalidInterval {
        lo: crate::bound::Bound,
        hi: crate::bound::Bound,
    },

    /// A time point name was referenced that the network has never seen
    /// (only raised by APIs that require existing points, e.g. point
    /// removal; `add_constraint` always creates points on demand).
    #[error("unknown time point: {0}")]
    UnknownTimePoint(String),

    /// An ISO-8601 absolute datetime or duration string could not be
    /// parsed, was out of the representable microsecond range, or used an
    /// unsupported designator (e.g. calendar years/months in a duration).
    #[error("malformed ISO-8601 value: {0}")]
    MalformedIso(String),
}
