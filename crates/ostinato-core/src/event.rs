use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of event payloads the synthesis engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TidalEvent {
    /// Trigger a voice's gate. Voices are zero-based internally; the
    /// pattern language counts them from 1.
    Gate { voice: usize },
    /// A pitched note as a MIDI number (60 = middle C).
    Note { midi: u8 },
    /// Trigger a named sample.
    Sample { name: String },
    /// Set a named control parameter.
    Float { param: String, value: f64 },
}

impl fmt::Display for TidalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TidalEvent::Gate { voice } => write!(f, "gate({})", voice + 1),
            TidalEvent::Note { midi } => write!(f, "note({midi})"),
            TidalEvent::Sample { name } => write!(f, "s({name})"),
            TidalEvent::Float { param, value } => write!(f, "{param}={value}"),
        }
    }
}
