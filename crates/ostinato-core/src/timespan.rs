use crate::fraction::Fraction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open span of cycle time `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub begin: Fraction,
    pub end: Fraction,
}

impl TimeSpan {
    pub fn new(begin: Fraction, end: Fraction) -> Self {
        TimeSpan { begin, end }
    }

    pub fn duration(&self) -> Fraction {
        self.end - self.begin
    }

    pub fn contains(&self, time: Fraction) -> bool {
        time >= self.begin && time < self.end
    }

    /// Overlap of two spans, or `None` if they share at most a boundary
    /// point. Touching spans do not overlap: ends are exclusive.
    pub fn intersection(&self, other: &TimeSpan) -> Option<TimeSpan> {
        let begin = self.begin.max(other.begin);
        let end = self.end.min(other.end);
        if begin < end {
            Some(TimeSpan::new(begin, end))
        } else {
            None
        }
    }

    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    pub fn shift(&self, amount: Fraction) -> TimeSpan {
        TimeSpan::new(self.begin + amount, self.end + amount)
    }

    /// Applies `f` to both endpoints.
    pub fn with_time<F>(&self, f: F) -> TimeSpan
    where
        F: Fn(Fraction) -> Fraction,
    {
        TimeSpan::new(f(self.begin), f(self.end))
    }

    /// Splits the span at integer cycle boundaries. Each returned piece lies
    /// within a single cycle. An empty or inverted span yields nothing.
    pub fn cycle_spans(&self) -> Vec<TimeSpan> {
        let mut spans = Vec::new();
        let mut begin = self.begin;
        while begin < self.end {
            let boundary = begin.floor() + Fraction::from_int(1);
            let end = boundary.min(self.end);
            spans.push(TimeSpan::new(begin, end));
            begin = end;
        }
        spans
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(b: (i64, i64), e: (i64, i64)) -> TimeSpan {
        TimeSpan::new(Fraction::new(b.0, b.1), Fraction::new(e.0, e.1))
    }

    #[test]
    fn intersection_of_overlapping_spans() {
        let a = span((0, 1), (1, 1));
        let b = span((1, 2), (3, 2));
        assert_eq!(a.intersection(&b), Some(span((1, 2), (1, 1))));
    }

    #[test]
    fn touching_spans_do_not_intersect() {
        let a = span((0, 1), (1, 2));
        let b = span((1, 2), (1, 1));
        assert_eq!(a.intersection(&b), None);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn contains_respects_half_open_bounds() {
        let s = span((0, 1), (1, 1));
        assert!(s.contains(Fraction::from_int(0)));
        assert!(s.contains(Fraction::new(1, 2)));
        assert!(!s.contains(Fraction::from_int(1)));
    }

    #[test]
    fn cycle_spans_split_at_integer_boundaries() {
        let pieces = span((1, 2), (5, 2)).cycle_spans();
        assert_eq!(
            pieces,
            vec![
                span((1, 2), (1, 1)),
                span((1, 1), (2, 1)),
                span((2, 1), (5, 2)),
            ]
        );
    }

    #[test]
    fn cycle_spans_of_empty_span_is_empty() {
        assert!(span((1, 1), (1, 1)).cycle_spans().is_empty());
        assert!(span((1, 1), (0, 1)).cycle_spans().is_empty());
    }

    #[test]
    fn cycle_spans_handle_negative_time() {
        let pieces = span((-3, 2), (1, 2)).cycle_spans();
        assert_eq!(
            pieces,
            vec![
                span((-3, 2), (-1, 1)),
                span((-1, 1), (0, 1)),
                span((0, 1), (1, 2)),
            ]
        );
    }
}
