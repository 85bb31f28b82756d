use crate::EngineError;

/// Musical tempo, kept in beats so users can think in BPM while the
/// scheduler works in cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoConfig {
    bpm: f64,
    beats_per_cycle: f64,
}

impl TempoConfig {
    pub fn new(bpm: f64, beats_per_cycle: f64) -> Result<Self, EngineError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(EngineError::InvalidTempo(bpm));
        }
        if !beats_per_cycle.is_finite() || beats_per_cycle <= 0.0 {
            return Err(EngineError::InvalidMeter(beats_per_cycle));
        }
        Ok(TempoConfig {
            bpm,
            beats_per_cycle,
        })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn beats_per_cycle(&self) -> f64 {
        self.beats_per_cycle
    }

    pub fn with_bpm(&self, bpm: f64) -> Result<Self, EngineError> {
        TempoConfig::new(bpm, self.beats_per_cycle)
    }

    pub fn with_beats_per_cycle(&self, beats_per_cycle: f64) -> Result<Self, EngineError> {
        TempoConfig::new(self.bpm, beats_per_cycle)
    }

    /// Cycle rate in cycles per second. 120 BPM over a 4-beat cycle is
    /// half a cycle per second.
    pub fn cycles_per_second(&self) -> f64 {
        self.bpm / self.beats_per_cycle / 60.0
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        TempoConfig {
            bpm: 120.0,
            beats_per_cycle: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tempo_runs_at_half_a_cycle_per_second() {
        let tempo = TempoConfig::default();
        assert_eq!(tempo.cycles_per_second(), 0.5);
    }

    #[test]
    fn rejects_non_positive_values() {
        assert!(matches!(
            TempoConfig::new(0.0, 4.0),
            Err(EngineError::InvalidTempo(_))
        ));
        assert!(matches!(
            TempoConfig::new(-10.0, 4.0),
            Err(EngineError::InvalidTempo(_))
        ));
        assert!(matches!(
            TempoConfig::new(120.0, 0.0),
            Err(EngineError::InvalidMeter(_))
        ));
        assert!(matches!(
            TempoConfig::new(f64::NAN, 4.0),
            Err(EngineError::InvalidTempo(_))
        ));
    }

    #[test]
    fn with_bpm_revalidates() {
        let tempo = TempoConfig::default();
        assert_eq!(tempo.with_bpm(150.0).unwrap().cycles_per_second(), 0.625);
        assert!(tempo.with_bpm(0.0).is_err());
    }
}
