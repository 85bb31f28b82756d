use crate::fraction::Fraction;
use crate::hap::Hap;
use crate::pattern::Pattern;
use crate::state::State;
use crate::timespan::TimeSpan;

/// A pattern that repeats `value` once per cycle, forever.
pub fn pure<T: Clone + Send + Sync + 'static>(value: T) -> Pattern<T> {
    Pattern::new(move |state: State| {
        state
            .span
            .cycle_spans()
            .into_iter()
            .map(|part| {
                let cycle = part.begin.floor();
                let whole = TimeSpan::new(cycle, cycle + Fraction::from_int(1));
                Hap::new(Some(whole), part, value.clone())
            })
            .collect()
    })
}

/// The empty pattern.
pub fn silence<T: Clone + Send + Sync + 'static>() -> Pattern<T> {
    Pattern::new(|_| Vec::new())
}

/// Concatenates patterns cycle by cycle: cycle `c` plays pattern
/// `c mod n`, and that pattern sees its own cycle count advance once per
/// `n` outer cycles. Cycle numbers may be negative; the rotation stays
/// consistent across zero.
pub fn slowcat<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    if patterns.is_empty() {
        return silence();
    }
    if patterns.len() == 1 {
        return patterns.into_iter().next().unwrap_or_else(silence);
    }
    let n = patterns.len() as i64;
    Pattern::new(move |state: State| {
        // split_queries guarantees the span sits within one cycle
        let cycle = state.span.begin.floor().numerator;
        let index = cycle.rem_euclid(n) as usize;
        // the chosen pattern runs on its own timeline: outer cycle c maps
        // to its cycle floor(c / n)
        let delta = Fraction::from_int(cycle - cycle.div_euclid(n));
        let Some(pattern) = patterns.get(index) else {
            return Vec::new();
        };
        pattern
            .query(state.set_span(state.span.shift(-delta)))
            .into_iter()
            .map(|hap| hap.with_span(|span| span.shift(delta)))
            .collect()
    })
    .split_queries()
}

/// Squeezes the patterns into a single cycle, each taking an equal share.
pub fn fastcat<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    let n = patterns.len();
    if n <= 1 {
        return patterns.into_iter().next().unwrap_or_else(silence);
    }
    slowcat(patterns)
        .fast(Fraction::from_int(n as i64))
        .set_steps(Some(Fraction::from_int(n as i64)))
}

/// Weighted concatenation: each pattern fills a share of the cycle
/// proportional to its weight, playing its own cycle `c` content during
/// outer cycle `c`. Pairs with non-positive weight are skipped.
pub fn timecat<T: Clone + Send + Sync + 'static>(pairs: Vec<(Fraction, Pattern<T>)>) -> Pattern<T> {
    let pairs: Vec<_> = pairs
        .into_iter()
        .filter(|(w, _)| !w.is_zero() && !w.is_negative())
        .collect();
    let total: Fraction = pairs
        .iter()
        .fold(Fraction::from_int(0), |acc, (w, _)| acc + *w);
    if pairs.is_empty() {
        return silence();
    }
    let steps = total;
    Pattern::new(move |state: State| {
        let span = state.span;
        let cycle = span.begin.floor();
        let mut haps = Vec::new();
        let mut acc = Fraction::from_int(0);
        for (weight, pattern) in &pairs {
            let begin = cycle + acc / total;
            let end = cycle + (acc + *weight) / total;
            acc = acc + *weight;
            let slot = TimeSpan::new(begin, end);
            let Some(overlap) = slot.intersection(&span) else {
                continue;
            };
            let width = *weight / total;
            // map the overlap into the child's own cycle, query, then map
            // the results back into the slot
            let inner = overlap.with_time(|t| cycle + (t - begin) / width);
            for hap in pattern.query(state.set_span(inner)) {
                haps.push(hap.with_span(|s| s.with_time(|t| begin + (t - cycle) * width)));
            }
        }
        haps
    })
    .set_steps(Some(steps))
    .split_queries()
}

/// Plays all patterns simultaneously.
pub fn stack<T: Clone + Send + Sync + 'static>(patterns: Vec<Pattern<T>>) -> Pattern<T> {
    Pattern::new(move |state: State| {
        patterns
            .iter()
            .flat_map(|pattern| pattern.query(state))
            .collect()
    })
}

/// Polymeter: stacks sequences of different lengths, speeding each so that
/// `steps_per_cycle` of its steps fit in one cycle. When no explicit step
/// count is given, the first pattern's length sets the pulse.
pub fn polymeter<T: Clone + Send + Sync + 'static>(
    patterns: Vec<Pattern<T>>,
    steps_per_cycle: Option<Fraction>,
) -> Pattern<T> {
    if patterns.is_empty() {
        return silence();
    }
    let base = steps_per_cycle
        .or_else(|| patterns[0].steps())
        .unwrap_or_else(|| Fraction::from_int(1));
    if base.is_zero() || base.is_negative() {
        return silence();
    }
    let branches = patterns
        .into_iter()
        .map(|pattern| {
            let steps = pattern.steps().unwrap_or_else(|| Fraction::from_int(1));
            if steps.is_zero() {
                silence()
            } else {
                pattern.fast(base / steps)
            }
        })
        .collect();
    stack(branches).set_steps(Some(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::query_cycle;

    fn f(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d)
    }

    fn whole(b: Fraction, e: Fraction) -> Option<TimeSpan> {
        Some(TimeSpan::new(b, e))
    }

    #[test]
    fn pure_repeats_every_cycle() {
        let p = pure("a");
        let haps = p.query(State::new(TimeSpan::new(f(0, 1), f(3, 1))));
        assert_eq!(haps.len(), 3);
        for (i, hap) in haps.iter().enumerate() {
            let c = i as i64;
            assert_eq!(hap.whole, whole(f(c, 1), f(c + 1, 1)));
            assert!(hap.has_onset());
        }
    }

    #[test]
    fn pure_clips_partial_queries_without_onset() {
        let p = pure("a");
        let haps = p.query(State::new(TimeSpan::new(f(1, 4), f(3, 4))));
        assert_eq!(haps.len(), 1);
        assert_eq!(haps[0].whole, whole(f(0, 1), f(1, 1)));
        assert_eq!(haps[0].part, TimeSpan::new(f(1, 4), f(3, 4)));
        assert!(!haps[0].has_onset());
    }

    #[test]
    fn slowcat_alternates_by_cycle() {
        let p = slowcat(vec![pure(0), pure(1), pure(2)]);
        for cycle in 0..6 {
            let haps = query_cycle(&p, cycle);
            assert_eq!(haps.len(), 1);
            assert_eq!(haps[0].value, (cycle % 3) as i32);
            assert!(haps[0].has_onset());
        }
    }

    #[test]
    fn slowcat_rotation_is_consistent_across_negative_cycles() {
        let p = slowcat(vec![pure(0), pure(1), pure(2)]);
        assert_eq!(query_cycle(&p, -1)[0].value, 2);
        assert_eq!(query_cycle(&p, -2)[0].value, 1);
        assert_eq!(query_cycle(&p, -3)[0].value, 0);
        assert_eq!(query_cycle(&p, -4)[0].value, 2);
    }

    #[test]
    fn slowcat_children_advance_their_own_timelines() {
        // the inner alternation should progress by one each time its slot
        // comes around
        let inner = slowcat(vec![pure("a"), pure("b")]);
        let p = slowcat(vec![inner, pure("x")]);
        assert_eq!(query_cycle(&p, 0)[0].value, "a");
        assert_eq!(query_cycle(&p, 1)[0].value, "x");
        assert_eq!(query_cycle(&p, 2)[0].value, "b");
        assert_eq!(query_cycle(&p, 3)[0].value, "x");
        assert_eq!(query_cycle(&p, 4)[0].value, "a");
    }

    #[test]
    fn fastcat_partitions_the_cycle() {
        let p = fastcat(vec![pure("a"), pure("b"), pure("c")]);
        let haps = query_cycle(&p, 0);
        assert_eq!(haps.len(), 3);
        assert_eq!(haps[0].whole, whole(f(0, 1), f(1, 3)));
        assert_eq!(haps[1].whole, whole(f(1, 3), f(2, 3)));
        assert_eq!(haps[2].whole, whole(f(2, 3), f(1, 1)));
        assert!(haps.iter().all(|h| h.has_onset()));
        assert_eq!(p.steps(), Some(f(3, 1)));
    }

    #[test]
    fn timecat_allocates_by_weight() {
        let p = timecat(vec![
            (Fraction::from_int(2), pure("a")),
            (Fraction::from_int(1), pure("b")),
        ]);
        let haps = query_cycle(&p, 0);
        assert_eq!(haps.len(), 2);
        assert_eq!(haps[0].whole, whole(f(0, 1), f(2, 3)));
        assert_eq!(haps[1].whole, whole(f(2, 3), f(1, 1)));
        assert!(haps.iter().all(|h| h.has_onset()));
    }

    #[test]
    fn timecat_with_equal_weights_matches_fastcat() {
        let weighted = timecat(vec![
            (Fraction::from_int(1), pure(0)),
            (Fraction::from_int(1), pure(1)),
        ]);
        let even = fastcat(vec![pure(0), pure(1)]);
        let s = State::new(TimeSpan::new(f(0, 1), f(2, 1)));
        assert_eq!(weighted.query(s), even.query(s));
    }

    #[test]
    fn timecat_nested_sequences_fill_their_slot() {
        let p = timecat(vec![
            (Fraction::from_int(1), fastcat(vec![pure(0), pure(1)])),
            (Fraction::from_int(1), pure(2)),
        ]);
        let haps = query_cycle(&p, 0);
        assert_eq!(haps.len(), 3);
        assert_eq!(haps[0].whole, whole(f(0, 1), f(1, 4)));
        assert_eq!(haps[1].whole, whole(f(1, 4), f(1, 2)));
        assert_eq!(haps[2].whole, whole(f(1, 2), f(1, 1)));
    }

    #[test]
    fn stack_overlays_all_patterns() {
        let p = stack(vec![pure("a"), fastcat(vec![pure("b"), pure("c")])]);
        let haps = query_cycle(&p, 0);
        assert_eq!(haps.len(), 3);
    }

    #[test]
    fn polymeter_matches_branch_lengths_to_the_first() {
        // {a b c, d e}: the second branch runs 3 steps per cycle too, so it
        // drifts against the first
        let p = polymeter(
            vec![
                fastcat(vec![pure("a"), pure("b"), pure("c")]),
                fastcat(vec![pure("d"), pure("e")]),
            ],
            None,
        );
        let cycle0: Vec<_> = query_cycle(&p, 0)
            .into_iter()
            .filter(|h| h.has_onset())
            .map(|h| h.value)
            .collect();
        assert_eq!(cycle0, vec!["a", "b", "c", "d", "e", "d"]);

        let cycle1: Vec<_> = query_cycle(&p, 1)
            .into_iter()
            .filter(|h| h.has_onset())
            .map(|h| h.value)
            .collect();
        assert_eq!(cycle1, vec!["a", "b", "c", "e", "d", "e"]);
    }

    #[test]
    fn polymeter_honors_explicit_step_count() {
        let p = polymeter(
            vec![fastcat(vec![pure("a"), pure("b")])],
            Some(Fraction::from_int(4)),
        );
        let haps = query_cycle(&p, 0);
        assert_eq!(haps.len(), 4);
        let values: Vec<_> = haps.iter().map(|h| h.value).collect();
        assert_eq!(values, vec!["a", "b", "a", "b"]);
    }
}
