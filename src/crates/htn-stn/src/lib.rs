//! Simple Temporal Network (STN).
//!
//! An STN is a set of time points and a set of pairwise distance
//! constraints between them, expressed as closed intervals `[lo, hi]` over
//! a lattice that includes `-∞`/`+∞`. Adding a constraint tightens any
//! existing constraint on the same pair by intersection; the network
//! tracks whether it remains consistent as constraints accumulate.
//!
//! This crate has no dependency on the planner: it is usable standalone for
//! any temporal-consistency problem expressed as point pairs and distance
//! bounds. `htn-core` calls into it only through [`Stn::add_interval`] and
//! [`Stn::is_consistent`] — the refinement engine never inspects STN
//! internals directly (see the planner's design notes on STN being an
//! explicit, not implicit, collaborator).
//!
//! # Example
//!
//! ```
//! use htn_stn::{Bound, Stn, Unit};
//!
//! let mut stn = Stn::new(Unit::Second, 1);
//! stn.add_constraint("a", "b", Bound::Finite(5), Bound::Finite(5)).unwrap();
//! stn.add_constraint("b", "c", Bound::Finite(5), Bound::Finite(5)).unwrap();
//! stn.add_constraint("a", "c", Bound::Finite(3), Bound::Finite(3)).unwrap();
//! assert!(!stn.is_consistent());
//! ```

mod bound;
mod config;
mod error;
mod interval;
mod iso;
mod network;
mod units;

pub use bound::Bound;
pub use config::StnConfig;
pub use error::StnError;
pub use interval::Interval;
pub use iso::{from_micros_abs, from_micros_dur, to_micros_abs, to_micros_dur};
pub use network::{tighten, Constraint, Stn, Tightened, EPOCH};
pub use units::{convert, Lod, Unit};
