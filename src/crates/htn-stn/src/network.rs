//! The Simple Temporal Network itself: time points, pairwise distance
//! constraints, and consistency checking.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::bound::Bound;
use crate::config::StnConfig;
use crate::error::StnError;
use crate::interval::Interval;
use crate::iso::{to_micros_abs, to_micros_dur};
use crate::units::{convert, Lod, Unit};

/// A stored distance constraint: a closed interval `[lo, hi]`.
pub type Constraint = (Bound, Bound);

/// Reserved time point anchoring absolute datetimes in [`Stn::add_interval`].
pub const EPOCH: &str = "epoch";

/// A Simple Temporal Network: a set of time points `P`, a symmetric map of
/// pairwise distance constraints `C`, and a `consistent` flag maintained
/// incrementally as constraints are added.
#[derive(Debug, Clone)]
pub struct Stn {
    points: HashSet<String>,
    constraints: HashMap<(String, String), Constraint>,
    consistent: bool,
    unit: Unit,
    lod: Lod,
}

/// Outcome of [`tighten`]: either the intersected interval, or a
/// distinguished signal that the intersection would be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tightened {
    Interval(Bound, Bound),
    CannotTighten,
}

/// Pure binary tightening: `tighten(e, t) = (max lows, min highs)`, unless
/// that would produce an empty interval.
pub fn tighten(e: Constraint, t: Constraint) -> Tightened {
    let lo = e.0.max(t.0);
    let hi = e.1.min(t.1);
    if lo > hi {
        Tightened::CannotTighten
    } else {
        Tightened::Interval(lo, hi)
    }
}

impl Stn {
    pub fn new(unit: Unit, lod: Lod) -> Self {
        Stn {
            points: HashSet::new(),
            constraints: HashMap::new(),
            consistent: true,
            unit,
            lod,
        }
    }

    /// Construct from an explicit [`StnConfig`] (see `from_env` for reading
    /// one from the process environment).
    pub fn from_config(config: StnConfig) -> Self {
        Stn::new(config.unit, config.lod)
    }

    /// Construct with unit/lod resolved from `HTN_STN_UNIT`/`HTN_STN_LOD`,
    /// falling back to whole microseconds when either is absent or
    /// malformed. For CLI-less embedding scenarios where no caller-supplied
    /// config is threaded through explicitly.
    pub fn from_env() -> Self {
        Stn::from_config(StnConfig::from_env())
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn lod(&self) -> Lod {
        self.lod
    }

    pub fn points(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|s| s.as_str())
    }

    /// Idempotent: introduces no constraint, only membership.
    pub fn add_time_point(&mut self, p: &str) {
        self.points.insert(p.to_string());
    }

    pub fn constraint(&self, u: &str, v: &str) -> Option<Constraint> {
        self.constraints.get(&(u.to_string(), v.to_string())).copied()
    }

    /// The network's incrementally-tracked consistency flag: `false` once
    /// any pairwise intersection has gone empty. See [`Stn::is_consistent`]
    /// for the full transitive check.
    pub fn consistent_flag(&self) -> bool {
        self.consistent
    }

    /// Add (or tighten) the constraint `(u, v, [lo, hi])`. Also records the
    /// symmetric reverse constraint `(v, u, [-hi, -lo])`. If a constraint
    /// already exists for either key, the stored interval becomes the
    /// pairwise intersection; an empty intersection clears the `consistent`
    /// flag but leaves the stored interval at its prior value.
    pub fn add_constraint(
        &mut self,
        u: &str,
        v: &str,
        lo: Bound,
        hi: Bound,
    ) -> Result<(), StnError> {
        if lo > hi {
            return Err(StnError::InvalidInterval { lo, hi });
        }
        self.add_time_point(u);
        self.add_time_point(v);

        let forward_ok = self.upsert(u, v, lo, hi);
        let reverse_ok = self.upsert(v, u, hi.negate(), lo.negate());

        self.consistent = self.consistent && forward_ok && reverse_ok;
        debug!(u, v, ?lo, ?hi, consistent = self.consistent, "stn: add_constraint");
        Ok(())
    }

    /// Insert or tighten a single directed key. Returns `false` if the
    /// tightening was empty (in which case the stored value is left
    /// unchanged).
    fn upsert(&mut self, u: &str, v: &str, lo: Bound, hi: Bound) -> bool {
        let key = (u.to_string(), v.to_string());
        match self.constraints.get(&key) {
            None => {
                self.constraints.insert(key, (lo, hi));
                true
            }
            Some(&existing) => match tighten(existing, (lo, hi)) {
                Tightened::Interval(nlo, nhi) => {
                    self.constraints.insert(key, (nlo, nhi));
                    true
                }
                Tightened::CannotTighten => false,
            },
        }
    }

    /// Remove both the forward and reverse keys for `(u, v)` atomically. A
    /// no-op if neither exists.
    pub fn remove_constraint(&mut self, u: &str, v: &str) {
        self.constraints.remove(&(u.to_string(), v.to_string()));
        self.constraints.remove(&(v.to_string(), u.to_string()));
    }

    /// Add a named interval `I(id, start, end, duration)`.
    ///
    /// `start`/`end` are optional ISO-8601 absolute datetimes; `duration`
    /// is an optional ISO-8601 duration used when one or both datetimes are
    /// absent. If both datetimes are present, the duration is computed as
    /// `micros(end) - micros(start)`, clamped to a minimum of 1 STN unit.
    /// Each endpoint with a known datetime is anchored to [`EPOCH`] via an
    /// equality constraint.
    pub fn add_interval(
        &mut self,
        id: &str,
        start: Option<&str>,
        end: Option<&str>,
        duration: Option<&str>,
    ) -> Result<Interval, StnError> {
        let interval = Interval::new(id);

        let start_micros = start.map(to_micros_abs).transpose()?;
        let end_micros = end.map(to_micros_abs).transpose()?;

        let duration_units = match (start_micros, end_micros) {
            (Some(s), Some(e)) => convert(e - s, self.unit, self.lod).max(1),
            _ => {
                let d = duration.ok_or_else(|| {
                    StnError::MalformedIso(format!(
                        "interval '{id}': no duration and not both endpoints known"
                    ))
                })?;
                convert(to_micros_dur(d)?, self.unit, self.lod).max(1)
            }
        };

        self.add_constraint(
            &interval.start_point,
            &interval.end_point,
            Bound::Finite(duration_units),
            Bound::Finite(duration_units),
        )?;

        if let Some(s) = start_micros {
            let offset = convert(s, self.unit, self.lod);
            self.add_constraint(
                EPOCH,
                &interval.start_point,
                Bound::Finite(offset),
                Bound::Finite(offset),
            )?;
        }
        if let Some(e) = end_micros {
            let offset = convert(e, self.unit, self.lod);
            self.add_constraint(
                EPOCH,
                &interval.end_point,
                Bound::Finite(offset),
                Bound::Finite(offset),
            )?;
        }

        trace!(id, duration_units, "stn: add_interval");
        Ok(interval)
    }

    /// Reduce the network to a directed distance graph (edge weight
    /// `u -> v` is the stored `hi(u, v)`, which already encodes
    /// `-lo(v, u)` thanks to symmetric storage) and run Floyd-Warshall
    /// over it. Shared by [`Stn::is_consistent`] and [`Stn::bound`] so
    /// both read off the same all-pairs shortest-path matrix instead of
    /// recomputing it independently.
    fn shortest_path_matrix(&self) -> (HashMap<&str, usize>, Vec<Vec<i128>>) {
        let points: Vec<&str> = self.points.iter().map(|s| s.as_str()).collect();
        let n = points.len();
        let index: HashMap<&str, usize> =
            points.iter().enumerate().map(|(i, p)| (*p, i)).collect();

        let mut dist = vec![vec![Self::INF; n]; n];
        for i in 0..n {
            dist[i][i] = 0;
        }
        for ((u, v), (_, hi)) in &self.constraints {
            let (Some(&i), Some(&j)) = (index.get(u.as_str()), index.get(v.as_str())) else {
                continue;
            };
            let w = Self::bound_to_i128(*hi);
            if w < dist[i][j] {
                dist[i][j] = w;
            }
        }

        for k in 0..n {
            for i in 0..n {
                if dist[i][k] >= Self::INF {
                    continue;
                }
                for j in 0..n {
                    if dist[k][j] >= Self::INF {
                        continue;
                    }
                    let via = dist[i][k] + dist[k][j];
                    if via < dist[i][j] {
                        dist[i][j] = via;
                    }
                }
            }
        }

        (index, dist)
    }

    const INF: i128 = i128::MAX / 4;

    fn bound_to_i128(b: Bound) -> i128 {
        match b {
            Bound::Finite(n) => n as i128,
            Bound::PosInf => Self::INF,
            Bound::NegInf => -Self::INF,
        }
    }

    fn i128_to_bound(v: i128) -> Bound {
        if v >= Self::INF {
            Bound::PosInf
        } else if v <= -Self::INF {
            Bound::NegInf
        } else {
            Bound::Finite(v as i64)
        }
    }

    /// Full consistency check. The network is consistent iff no point has
    /// a negative shortest distance to itself in the all-pairs matrix.
    ///
    /// This both re-derives the simpler checks (rejecting `lo > hi`,
    /// rejecting direct same-pair opposite positive lower bounds) and
    /// catches inconsistencies that only appear after composing
    /// constraints transitively (e.g. three pairwise constraints that are
    /// individually fine but jointly contradictory).
    pub fn is_consistent(&self) -> bool {
        if !self.consistent {
            return false;
        }
        if self.points.is_empty() {
            return true;
        }
        let (_, dist) = self.shortest_path_matrix();
        (0..dist.len()).all(|i| dist[i][i] >= 0)
    }

    /// The transitively-tightened distance bound between `from` and `to`,
    /// derived by running Floyd-Warshall over every constraint added so
    /// far. Unlike [`Stn::constraint`], which returns only the literal
    /// stored interval for the pair (or `None` if that exact pair was
    /// never inserted), this reflects bounds implied through any chain of
    /// intermediate points. Returns `None` if either point is unknown to
    /// the network.
    pub fn bound(&self, from: &str, to: &str) -> Option<Constraint> {
        let (index, dist) = self.shortest_path_matrix();
        let i = *index.get(from)?;
        let j = *index.get(to)?;
        let hi = Self::i128_to_bound(dist[i][j]);
        let lo = Self::i128_to_bound(dist[j][i]).negate();
        Some((lo, hi))
    }

    /// The tightened `(earliest, latest)` offset of `p` relative to
    /// [`EPOCH`], in this network's unit. A convenience wrapper over
    /// [`Stn::bound`] for the common case of reading a schedule bound off
    /// the zero point rather than another named time point.
    pub fn earliest(&self, p: &str) -> Option<Constraint> {
        self.bound(EPOCH, p)
    }
}
