use crate::combinators::{fastcat, pure, silence};
use crate::euclid::euclid_rhythm;
use crate::fraction::Fraction;
use crate::hap::Hap;
use crate::state::State;
use crate::timespan::TimeSpan;
use std::sync::Arc;

/// A pattern is a pure function from a time span to the haps active during
/// that span. Querying never mutates the pattern, so the same span always
/// yields the same haps and overlapping windows agree on shared events.
pub struct Pattern<T> {
    query_func: Arc<dyn Fn(State) -> Vec<Hap<T>> + Send + Sync>,
    steps: Option<Fraction>,
}

impl<T> std::fmt::Debug for Pattern<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl<T> Clone for Pattern<T> {
    fn clone(&self) -> Self {
        Pattern {
            query_func: Arc::clone(&self.query_func),
            steps: self.steps,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Pattern<T> {
    pub fn new<F>(query_func: F) -> Self
    where
        F: Fn(State) -> Vec<Hap<T>> + Send + Sync + 'static,
    {
        Pattern {
            query_func: Arc::new(query_func),
            steps: None,
        }
    }

    pub fn query(&self, state: State) -> Vec<Hap<T>> {
        (self.query_func)(state)
    }

    /// Steps per cycle, when this pattern was built from a sequence. Used by
    /// polymeter to match branch lengths.
    pub fn steps(&self) -> Option<Fraction> {
        self.steps
    }

    pub fn set_steps(mut self, steps: Option<Fraction>) -> Self {
        self.steps = steps;
        self
    }

    /// Maps a function over every hap value, leaving timing intact.
    pub fn with_value<U, F>(&self, f: F) -> Pattern<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let query = Arc::clone(&self.query_func);
        Pattern {
            query_func: Arc::new(move |state| {
                query(state).iter().map(|hap| hap.map_value(&f)).collect()
            }),
            steps: self.steps,
        }
    }

    pub fn with_hap<F>(&self, f: F) -> Pattern<T>
    where
        F: Fn(Hap<T>) -> Hap<T> + Send + Sync + 'static,
    {
        let query = Arc::clone(&self.query_func);
        Pattern {
            query_func: Arc::new(move |state| query(state).into_iter().map(&f).collect()),
            steps: self.steps,
        }
    }

    /// Transforms the query span on the way in.
    pub fn with_query_time<F>(&self, f: F) -> Pattern<T>
    where
        F: Fn(Fraction) -> Fraction + Send + Sync + 'static,
    {
        let query = Arc::clone(&self.query_func);
        Pattern {
            query_func: Arc::new(move |state: State| {
                query(state.set_span(state.span.with_time(&f)))
            }),
            steps: self.steps,
        }
    }

    /// Transforms every hap span on the way out.
    pub fn with_hap_time<F>(&self, f: F) -> Pattern<T>
    where
        F: Fn(Fraction) -> Fraction + Send + Sync + 'static,
    {
        self.with_hap(move |hap| hap.with_span(|span| span.with_time(&f)))
    }

    /// Breaks queries at integer cycle boundaries so the inner query
    /// function only ever sees spans within a single cycle. Required by any
    /// combinator that inspects the query's cycle number.
    pub fn split_queries(&self) -> Pattern<T> {
        let query = Arc::clone(&self.query_func);
        Pattern {
            query_func: Arc::new(move |state: State| {
                state
                    .span
                    .cycle_spans()
                    .into_iter()
                    .flat_map(|span| query(state.set_span(span)))
                    .collect()
            }),
            steps: self.steps,
        }
    }

    /// Speeds the pattern up so `factor` cycles of it fit in one cycle.
    /// Non-positive factors give silence.
    pub fn fast(&self, factor: Fraction) -> Pattern<T> {
        if factor.is_zero() || factor.is_negative() {
            return silence();
        }
        self.with_query_time(move |t| t * factor)
            .with_hap_time(move |t| t / factor)
    }

    pub fn slow(&self, factor: Fraction) -> Pattern<T> {
        if factor.is_zero() || factor.is_negative() {
            return silence();
        }
        self.fast(Fraction::from_int(1) / factor)
    }

    /// Shifts the pattern later in time by `amount` cycles.
    pub fn late(&self, amount: Fraction) -> Pattern<T> {
        self.with_query_time(move |t| t - amount)
            .with_hap_time(move |t| t + amount)
    }

    pub fn early(&self, amount: Fraction) -> Pattern<T> {
        self.late(-amount)
    }

    /// Applies `f` on every `n`th cycle, counting from cycle 0. Negative
    /// cycles continue the same modular sequence, so `every(2, ..)` applies
    /// on cycles ..., -4, -2, 0, 2, 4, ...
    pub fn every<F>(&self, n: i64, f: F) -> Pattern<T>
    where
        F: Fn(Pattern<T>) -> Pattern<T>,
    {
        if n <= 0 {
            return self.clone();
        }
        let base = self.clone();
        let transformed = f(self.clone());
        Pattern::new(move |state: State| {
            let cycle = state.span.begin.floor().numerator;
            if cycle.rem_euclid(n) == 0 {
                transformed.query(state)
            } else {
                base.query(state)
            }
        })
        .set_steps(self.steps)
        .split_queries()
    }

    /// Uses a boolean pattern as rhythmic structure: wherever the structure
    /// has a true onset, this pattern is sampled over that step.
    pub fn struct_(&self, structure: &Pattern<bool>) -> Pattern<T> {
        let values = self.clone();
        let structure = structure.clone();
        Pattern::new(move |state: State| {
            let mut haps = Vec::new();
            for s in structure.query(state) {
                if !s.value {
                    continue;
                }
                let step = s.whole_or_part();
                for v in values.query(state.set_span(step)) {
                    if let Some(part) = s.part.intersection(&v.part) {
                        haps.push(Hap::with_context(
                            s.whole,
                            part,
                            v.value.clone(),
                            v.context.combine(&s.context),
                        ));
                    }
                }
            }
            haps
        })
        .set_steps(self.steps)
    }

    /// Euclidean rhythm: `pulses` onsets spread over `steps` slots per
    /// cycle, each onset sampling this pattern. `rotation` shifts which slot
    /// is the downbeat.
    pub fn euclid(&self, pulses: usize, steps: usize, rotation: i64) -> Pattern<T> {
        let rhythm = euclid_rhythm(pulses, steps, rotation);
        if rhythm.is_empty() {
            return silence();
        }
        let structure = fastcat(rhythm.into_iter().map(pure).collect());
        self.struct_(&structure)
    }
}

/// Queries a single cycle and keeps only the haps whose onset lies in it.
/// Convenience for tests and the CLI.
pub fn query_cycle<T: Clone + Send + Sync + 'static>(
    pattern: &Pattern<T>,
    cycle: i64,
) -> Vec<Hap<T>> {
    let span = TimeSpan::new(Fraction::from_int(cycle), Fraction::from_int(cycle + 1));
    pattern.query(State::new(span))
}
