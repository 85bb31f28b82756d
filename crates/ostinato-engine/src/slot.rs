use arc_swap::ArcSwap;
use ostinato_core::{Fraction, Pattern, TidalEvent};
use std::collections::HashMap;
use std::sync::Arc;

/// A named live-coding slot. The pattern sits behind an [`ArcSwap`] so a
/// replacement is a single atomic pointer store: the scheduler either sees
/// the old pattern or the new one, never a half-written state.
pub struct Slot {
    pattern: ArcSwap<Pattern<TidalEvent>>,
    voice: usize,
    cycle_offset: ArcSwap<Fraction>,
}

impl Slot {
    pub fn new(pattern: Pattern<TidalEvent>, voice: usize) -> Self {
        Slot {
            pattern: ArcSwap::from_pointee(pattern),
            voice,
            cycle_offset: ArcSwap::from_pointee(Fraction::from_int(0)),
        }
    }

    pub fn pattern(&self) -> Arc<Pattern<TidalEvent>> {
        self.pattern.load_full()
    }

    pub fn replace(&self, pattern: Pattern<TidalEvent>) {
        self.pattern.store(Arc::new(pattern));
    }

    /// Default voice for pitched events from this slot.
    pub fn voice(&self) -> usize {
        self.voice
    }

    /// Phase shift applied when the scheduler queries this slot.
    pub fn cycle_offset(&self) -> Fraction {
        **self.cycle_offset.load()
    }

    pub fn set_cycle_offset(&self, offset: Fraction) {
        self.cycle_offset.store(Arc::new(offset));
    }
}

/// All active slots, indexed by name. The map itself is swapped atomically
/// on insert and remove, so the scheduler's per-tick snapshot is lock-free
/// and immune to concurrent edits.
#[derive(Default)]
pub struct SlotRegistry {
    slots: ArcSwap<HashMap<String, Arc<Slot>>>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        SlotRegistry::default()
    }

    /// Assigns a pattern to a slot, creating the slot if needed. An
    /// existing slot keeps its identity and swaps only the pattern, so a
    /// scheduler holding the old snapshot still picks up the change.
    pub fn set(&self, id: &str, pattern: Pattern<TidalEvent>) {
        if let Some(slot) = self.slots.load().get(id) {
            slot.replace(pattern);
            return;
        }
        let slot = Arc::new(Slot::new(pattern, voice_for(id)));
        self.slots.rcu(|slots| {
            let mut slots = HashMap::clone(slots);
            slots.insert(id.to_string(), Arc::clone(&slot));
            slots
        });
    }

    /// Silences and removes a slot. Unknown ids are ignored.
    pub fn clear(&self, id: &str) {
        self.slots.rcu(|slots| {
            let mut slots = HashMap::clone(slots);
            slots.remove(id);
            slots
        });
    }

    /// Removes every slot.
    pub fn clear_all(&self) {
        self.slots.store(Arc::new(HashMap::new()));
    }

    pub fn get(&self, id: &str) -> Option<Arc<Slot>> {
        self.slots.load().get(id).cloned()
    }

    /// A consistent view of all slots for one scheduler tick.
    pub fn snapshot(&self) -> Arc<HashMap<String, Arc<Slot>>> {
        self.slots.load_full()
    }
}

/// Maps conventional slot names to engine voices: `d1` through `d12` take
/// voices 0 through 11, anything else falls back to voice 0.
fn voice_for(id: &str) -> usize {
    id.strip_prefix('d')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| (1..=12).contains(n))
        .map(|n| n - 1)
        .unwrap_or(0)
}
