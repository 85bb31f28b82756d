use crate::timespan::TimeSpan;
use serde::{Deserialize, Serialize};

/// Source provenance carried by every hap. Locations are `(start, end)`
/// character offsets into the pattern text that produced the value, so an
/// editor can highlight the token when the event fires.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Context {
    pub locations: Vec<(usize, usize)>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// Merges provenance from two haps, e.g. when a structure pattern and a
    /// value pattern combine into one event.
    pub fn combine(&self, other: &Context) -> Context {
        let mut locations = self.locations.clone();
        locations.extend(other.locations.iter().copied());
        Context { locations }
    }
}

/// An event fragment: a value active over `part`, belonging to a logical
/// event spanning `whole`. Continuous signals have no whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hap<T> {
    pub whole: Option<TimeSpan>,
    pub part: TimeSpan,
    pub value: T,
    pub context: Context,
}

impl<T: Clone> Hap<T> {
    pub fn new(whole: Option<TimeSpan>, part: TimeSpan, value: T) -> Self {
        Hap {
            whole,
            part,
            value,
            context: Context::new(),
        }
    }

    pub fn with_context(
        whole: Option<TimeSpan>,
        part: TimeSpan,
        value: T,
        context: Context,
    ) -> Self {
        Hap {
            whole,
            part,
            value,
            context,
        }
    }

    /// True when this fragment carries the onset of its logical event.
    /// Fragments clipped away from their onset answer false, which is what
    /// keeps re-queried windows from double-triggering.
    pub fn has_onset(&self) -> bool {
        match self.whole {
            Some(whole) => whole.begin == self.part.begin,
            None => false,
        }
    }

    pub fn whole_or_part(&self) -> TimeSpan {
        self.whole.unwrap_or(self.part)
    }

    pub fn with_span<F>(&self, f: F) -> Hap<T>
    where
        F: Fn(&TimeSpan) -> TimeSpan,
    {
        Hap {
            whole: self.whole.as_ref().map(&f),
            part: f(&self.part),
            value: self.value.clone(),
            context: self.context.clone(),
        }
    }

    pub fn map_value<U, F>(&self, f: F) -> Hap<U>
    where
        U: Clone,
        F: FnOnce(&T) -> U,
    {
        Hap {
            whole: self.whole,
            part: self.part,
            value: f(&self.value),
            context: self.context.clone(),
        }
    }

    pub fn with_location(mut self, location: (usize, usize)) -> Hap<T> {
        self.context.locations.push(location);
        self
    }
}
