use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cue::spec::CueSpec;

/// Number of phases in one breathing cycle.
pub const PHASE_COUNT: usize = 4;

/// Milliseconds spent in each phase of the box pattern.
pub const PHASE_DURATION_MS: u64 = 4_000;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseName {
    Inhale,
    Hold,
    Exhale,
    /// The hold with empty lungs, after the exhale.
    Hold2,
}

impl PhaseName {
    /// Text shown to the user while the phase lasts.
    pub fn instruction(&self) -> &'static str {
        match self {
            PhaseName::Inhale => "Breathe In",
            PhaseName::Hold | PhaseName::Hold2 => "Hold",
            PhaseName::Exhale => "Breathe Out",
        }
    }

    /// True while the lungs are full.
    pub fn is_expanded(&self) -> bool {
        matches!(self, PhaseName::Inhale | PhaseName::Hold)
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseName::Inhale => "inhale",
            PhaseName::Hold => "hold",
            PhaseName::Exhale => "exhale",
            PhaseName::Hold2 => "hold2",
        };
        f.write_str(name)
    }
}

/// One stage of the breathing pattern.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub name: PhaseName,
    pub duration_ms: u64,
    pub cue: CueSpec,
}

/// Inhale, hold, exhale, hold: four seconds each.
pub const BOX_PATTERN: [Phase; PHASE_COUNT] = [
    Phase {
        name: PhaseName::Inhale,
        duration_ms: PHASE_DURATION_MS,
        cue: CueSpec::INHALE,
    },
    Phase {
        name: PhaseName::Hold,
        duration_ms: PHASE_DURATION_MS,
        cue: CueSpec::HOLD,
    },
    Phase {
        name: PhaseName::Exhale,
        duration_ms: PHASE_DURATION_MS,
        cue: CueSpec::EXHALE,
    },
    Phase {
        name: PhaseName::Hold2,
        duration_ms: PHASE_DURATION_MS,
        cue: CueSpec::HOLD,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_is_four_equal_phases() {
        let names: Vec<_> = BOX_PATTERN.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                PhaseName::Inhale,
                PhaseName::Hold,
                PhaseName::Exhale,
                PhaseName::Hold2
            ]
        );
        assert!(BOX_PATTERN.iter().all(|p| p.duration_ms == 4_000));
    }

    #[test]
    fn every_cue_fits_its_duration() {
        assert!(BOX_PATTERN.iter().all(|p| p.cue.is_valid()));
    }

    #[test]
    fn both_holds_read_the_same() {
        assert_eq!(PhaseName::Hold.instruction(), PhaseName::Hold2.instruction());
        assert!(PhaseName::Hold.is_expanded());
        assert!(!PhaseName::Hold2.is_expanded());
    }
}
