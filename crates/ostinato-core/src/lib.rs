//! Core pattern engine: exact rational time, the hap/event model, and the
//! pattern algebra.
//!
//! A [`Pattern`] is a pure function from a [`TimeSpan`] to the [`Hap`]s
//! active during it. Combinators build new patterns out of old ones without
//! ever mutating state, which is what lets a scheduler query any window at
//! any time and always get consistent answers.

pub mod combinators;
pub mod euclid;
pub mod event;
pub mod fraction;
pub mod hap;
pub mod pattern;
pub mod state;
pub mod timespan;

pub use combinators::{fastcat, polymeter, pure, silence, slowcat, stack, timecat};
pub use euclid::{bjorklund, euclid_rhythm};
pub use event::TidalEvent;
pub use fraction::Fraction;
pub use hap::{Context, Hap};
pub use pattern::{query_cycle, Pattern};
pub use state::State;
pub use timespan::TimeSpan;
