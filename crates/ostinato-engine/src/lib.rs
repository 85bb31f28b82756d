//! Real-time scheduling for ostinato patterns.
//!
//! The [`Scheduler`] queries each slot over a lookahead window and hands
//! timestamped actions to an [`Engine`] implementation. Pattern text enters
//! the system through the [`Repl`], which compiles statements and swaps
//! them into the [`SlotRegistry`] without interrupting playback.

pub mod engine;
pub mod repl;
pub mod scheduler;
pub mod slot;
pub mod tempo;

pub use engine::{Engine, EngineCall, RecordingEngine};
pub use repl::Repl;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle};
pub use slot::{Slot, SlotRegistry};
pub use tempo::TempoConfig;

use ostinato_mini::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid tempo: bpm must be positive and finite, got {0}")]
    InvalidTempo(f64),

    #[error("invalid meter: beats per cycle must be positive and finite, got {0}")]
    InvalidMeter(f64),

    #[error(transparent)]
    Pattern(#[from] ParseError),
}
