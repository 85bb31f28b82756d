//! Euclidean rhythm generation via Bjorklund's algorithm.

/// Distributes `pulses` onsets as evenly as possible over `steps` slots.
///
/// Uses the bisection form of Bjorklund's algorithm: onset and rest groups
/// are repeatedly zip-merged until at most one remainder group is left.
/// `bjorklund(3, 8)` gives `x..x..x.` and `bjorklund(5, 8)` gives
/// `x.xx.xx.`.
pub fn bjorklund(pulses: usize, steps: usize) -> Vec<bool> {
    if steps == 0 {
        return Vec::new();
    }
    if pulses == 0 {
        return vec![false; steps];
    }
    if pulses >= steps {
        return vec![true; steps];
    }

    let mut groups: Vec<Vec<bool>> = vec![vec![true]; pulses];
    let mut remainder: Vec<Vec<bool>> = vec![vec![false]; steps - pulses];

    while remainder.len() > 1 {
        let pairs = groups.len().min(remainder.len());
        let mut merged = Vec::with_capacity(pairs);
        for i in 0..pairs {
            let mut group = groups[i].clone();
            group.extend_from_slice(&remainder[i]);
            merged.push(group);
        }
        let leftover = if groups.len() > pairs {
            groups.split_off(pairs)
        } else {
            remainder.split_off(pairs)
        };
        groups = merged;
        remainder = leftover;
    }

    groups
        .into_iter()
        .chain(remainder)
        .flatten()
        .collect()
}

/// A Euclidean rhythm with rotation. Positive rotation shifts the pattern
/// left, so the slot `rotation` steps in becomes the downbeat.
pub fn euclid_rhythm(pulses: usize, steps: usize, rotation: i64) -> Vec<bool> {
    let mut rhythm = bjorklund(pulses, steps);
    if steps > 0 {
        let shift = rotation.rem_euclid(steps as i64) as usize;
        rhythm.rotate_left(shift);
    }
    rhythm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onsets(rhythm: &[bool]) -> Vec<usize> {
        rhythm
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect()
    }

    #[test]
    fn tresillo() {
        assert_eq!(onsets(&bjorklund(3, 8)), vec![0, 3, 6]);
    }

    #[test]
    fn cinquillo() {
        assert_eq!(onsets(&bjorklund(5, 8)), vec![0, 2, 3, 5, 6]);
    }

    #[test]
    fn classic_world_rhythms() {
        assert_eq!(onsets(&bjorklund(2, 5)), vec![0, 2]);
        assert_eq!(onsets(&bjorklund(3, 4)), vec![0, 1, 2]);
        assert_eq!(onsets(&bjorklund(4, 9)), vec![0, 2, 4, 6]);
        assert_eq!(onsets(&bjorklund(5, 16)), vec![0, 3, 6, 9, 12]);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(bjorklund(0, 4), vec![false; 4]);
        assert_eq!(bjorklund(4, 4), vec![true; 4]);
        assert_eq!(bjorklund(7, 4), vec![true; 4]);
        assert!(bjorklund(3, 0).is_empty());
    }

    #[test]
    fn pulse_count_is_preserved() {
        for steps in 1..24usize {
            for pulses in 0..=steps {
                let rhythm = bjorklund(pulses, steps);
                assert_eq!(rhythm.len(), steps);
                assert_eq!(rhythm.iter().filter(|&&b| b).count(), pulses);
            }
        }
    }

    #[test]
    fn rotation_shifts_the_downbeat() {
        assert_eq!(onsets(&euclid_rhythm(3, 8, 0)), vec![0, 3, 6]);
        assert_eq!(onsets(&euclid_rhythm(3, 8, 3)), vec![0, 3, 5]);
        assert_eq!(onsets(&euclid_rhythm(3, 8, -1)), vec![1, 4, 7]);
        assert_eq!(onsets(&euclid_rhythm(3, 8, 8)), onsets(&euclid_rhythm(3, 8, 0)));
    }
}
