use crate::slot::SlotRegistry;
use crate::tempo::TempoConfig;
use crate::EngineError;
use arc_swap::ArcSwap;
use ostinato_mini::compile;
use std::sync::Arc;
use tracing::info;

/// The live-coding surface: evaluate statements into slots, silence them,
/// and steer the tempo. All operations are safe to call while the
/// scheduler is running; a failed evaluation leaves the slot playing
/// whatever it played before.
pub struct Repl {
    registry: Arc<SlotRegistry>,
    tempo: Arc<ArcSwap<TempoConfig>>,
}

impl Repl {
    pub fn new(registry: Arc<SlotRegistry>, tempo: Arc<ArcSwap<TempoConfig>>) -> Self {
        Repl { registry, tempo }
    }

    /// Compiles `source` and swaps it into the named slot atomically.
    /// On a parse or compile error, the slot is left untouched.
    pub fn evaluate(&self, slot: &str, source: &str) -> Result<(), EngineError> {
        let pattern = compile(source)?;
        self.registry.set(slot, pattern);
        info!(slot, "pattern updated");
        Ok(())
    }

    /// Silences and removes one slot.
    pub fn clear(&self, slot: &str) {
        self.registry.clear(slot);
        info!(slot, "slot cleared");
    }

    /// Silences everything.
    pub fn hush(&self) {
        self.registry.clear_all();
        info!("all slots cleared");
    }

    pub fn set_bpm(&self, bpm: f64) -> Result<(), EngineError> {
        let next = self.tempo.load().with_bpm(bpm)?;
        self.tempo.store(Arc::new(next));
        Ok(())
    }

    pub fn set_beats_per_cycle(&self, beats: f64) -> Result<(), EngineError> {
        let next = self.tempo.load().with_beats_per_cycle(beats)?;
        self.tempo.store(Arc::new(next));
        Ok(())
    }

    pub fn tempo(&self) -> TempoConfig {
        **self.tempo.load()
    }
}
