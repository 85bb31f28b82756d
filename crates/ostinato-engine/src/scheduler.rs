use crate::engine::Engine;
use crate::slot::SlotRegistry;
use crate::tempo::TempoConfig;
use arc_swap::ArcSwap;
use ostinato_core::{Fraction, State, TidalEvent, TimeSpan};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// How far ahead of the clock each query reaches.
    pub lookahead: Duration,
    /// How often the run loop ticks.
    pub tick_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            lookahead: Duration::from_millis(100),
            tick_interval: Duration::from_millis(25),
        }
    }
}

/// An engine action due at a point in wall-clock time.
struct Due {
    at: f64,
    kind: DueKind,
}

enum DueKind {
    GateOn { voice: usize },
    GateOff { voice: usize },
    Note { midi: u8, voice: usize },
    Sample { name: String },
    Float { param: String, value: f64 },
}

/// Queries every slot over a lookahead window each tick and dispatches the
/// resulting onsets to the engine.
///
/// Each window starts exactly where the previous one ended, in cycle time.
/// A late tick widens the next window instead of shifting it, so onsets
/// are never skipped or delivered twice. Tempo is read once per tick, so a
/// tempo change lands on the next window boundary.
pub struct Scheduler {
    registry: Arc<SlotRegistry>,
    tempo: Arc<ArcSwap<TempoConfig>>,
    config: SchedulerConfig,
    /// Start of the next window: cycle position and the wall-clock second
    /// it corresponds to. `None` until the first tick after start or reset.
    next: Option<(Fraction, f64)>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<SlotRegistry>,
        tempo: Arc<ArcSwap<TempoConfig>>,
        config: SchedulerConfig,
    ) -> Self {
        Scheduler {
            registry,
            tempo,
            config,
            next: None,
        }
    }

    /// Runs one scheduling step at wall-clock second `now`. Exposed so
    /// tests can drive the clock by hand; the run loop calls this on a
    /// fixed cadence.
    pub fn tick(&mut self, now: f64, engine: &dyn Engine) {
        let tempo = **self.tempo.load();
        let cps = tempo.cycles_per_second();
        let lookahead_cycles = self.config.lookahead.as_secs_f64() * cps;

        let (start_cycle, start_time) = match self.next {
            Some(next) => next,
            None => (Fraction::from_int(0), now),
        };
        let elapsed = (now - start_time).max(0.0);
        let end_cycle = start_cycle + Fraction::from_float(elapsed * cps + lookahead_cycles);
        if end_cycle <= start_cycle {
            self.next = Some((start_cycle, start_time));
            return;
        }
        let window = TimeSpan::new(start_cycle, end_cycle);
        let to_seconds = |cycle: Fraction| start_time + (cycle - start_cycle).to_float() / cps;

        let mut due: Vec<Due> = Vec::new();
        for (id, slot) in self.registry.snapshot().iter() {
            let offset = slot.cycle_offset();
            let pattern = slot.pattern();
            let query_span = window.shift(-offset);
            let result = catch_unwind(AssertUnwindSafe(|| {
                pattern.query(State::new(query_span))
            }));
            let haps = match result {
                Ok(haps) => haps,
                Err(_) => {
                    warn!(slot = %id, "pattern query panicked, skipping it this window");
                    continue;
                }
            };
            for hap in haps {
                if !hap.has_onset() {
                    continue;
                }
                let onset = hap.part.begin + offset;
                // patterns are trusted to stay inside the query span, but a
                // stray hap must not fire in someone else's window
                if !window.contains(onset) {
                    continue;
                }
                let at = to_seconds(onset);
                match &hap.value {
                    TidalEvent::Gate { voice } => {
                        due.push(Due {
                            at,
                            kind: DueKind::GateOn { voice: *voice },
                        });
                        if let Some(whole) = hap.whole {
                            due.push(Due {
                                at: to_seconds(whole.end + offset),
                                kind: DueKind::GateOff { voice: *voice },
                            });
                        }
                    }
                    TidalEvent::Note { midi } => due.push(Due {
                        at,
                        kind: DueKind::Note {
                            midi: *midi,
                            voice: slot.voice(),
                        },
                    }),
                    TidalEvent::Sample { name } => due.push(Due {
                        at,
                        kind: DueKind::Sample { name: name.clone() },
                    }),
                    TidalEvent::Float { param, value } => due.push(Due {
                        at,
                        kind: DueKind::Float {
                            param: param.clone(),
                            value: *value,
                        },
                    }),
                }
            }
        }

        due.sort_by(|a, b| a.at.total_cmp(&b.at));
        for action in due {
            match action.kind {
                DueKind::GateOn { voice } => engine.gate_on(voice, action.at),
                DueKind::GateOff { voice } => engine.gate_off(voice, action.at),
                DueKind::Note { midi, voice } => engine.note_on(midi, voice, action.at),
                DueKind::Sample { name } => engine.sample_trigger(&name, action.at),
                DueKind::Float { param, value } => {
                    engine.set_float_param(&param, value, action.at)
                }
            }
        }

        self.next = Some((end_cycle, to_seconds(end_cycle)));
    }

    /// Forgets the clock position. The next tick starts again from cycle 0.
    pub fn reset(&mut self) {
        self.next = None;
    }

    /// Spawns the run loop on its own thread. The returned handle stops it.
    pub fn run(mut self, engine: Arc<dyn Engine>) -> SchedulerHandle {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let tick_interval = self.config.tick_interval;
        let handle = thread::spawn(move || {
            let origin = Instant::now();
            while flag.load(Ordering::Relaxed) {
                self.tick(origin.elapsed().as_secs_f64(), engine.as_ref());
                thread::sleep(tick_interval);
            }
        });
        SchedulerHandle {
            running,
            handle: Some(handle),
        }
    }
}

/// Owner of a running scheduler thread.
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stops the run loop and waits for the thread. Safe to call more than
    /// once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
