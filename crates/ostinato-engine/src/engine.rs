use std::sync::Mutex;

/// The synthesis backend the scheduler dispatches into. Timestamps are
/// seconds on the engine's own monotonic clock; implementations are
/// expected to queue the action for that time rather than act immediately.
pub trait Engine: Send + Sync {
    fn gate_on(&self, voice: usize, at: f64);
    fn gate_off(&self, voice: usize, at: f64);
    fn note_on(&self, midi: u8, voice: usize, at: f64);
    fn sample_trigger(&self, name: &str, at: f64);
    fn set_float_param(&self, param: &str, value: f64, at: f64);
}

/// One dispatched engine action, as recorded by [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    GateOn { voice: usize, at: f64 },
    GateOff { voice: usize, at: f64 },
    NoteOn { midi: u8, voice: usize, at: f64 },
    SampleTrigger { name: String, at: f64 },
    FloatParam { param: String, value: f64, at: f64 },
}

/// An engine that records every call instead of making sound. Useful for
/// tests and offline inspection of what a pattern would trigger.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        RecordingEngine::default()
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, call: EngineCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Engine for RecordingEngine {
    fn gate_on(&self, voice: usize, at: f64) {
        self.record(EngineCall::GateOn { voice, at });
    }

    fn gate_off(&self, voice: usize, at: f64) {
        self.record(EngineCall::GateOff { voice, at });
    }

    fn note_on(&self, midi: u8, voice: usize, at: f64) {
        self.record(EngineCall::NoteOn { midi, voice, at });
    }

    fn sample_trigger(&self, name: &str, at: f64) {
        self.record(EngineCall::SampleTrigger {
            name: name.to_string(),
            at,
        });
    }

    fn set_float_param(&self, param: &str, value: f64, at: f64) {
        self.record(EngineCall::FloatParam {
            param: param.to_string(),
            value,
            at,
        });
    }
}
