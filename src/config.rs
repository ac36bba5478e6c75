//! Generator tuning knobs.

use crate::ast::MAX_REPEAT_COUNT;
use crate::error::Error;

/// Chance that a repetition past its minimum produces one more copy.
pub const DEFAULT_CONTINUE_PROBABILITY: f64 = 0.7;

/// Generate-then-verify cycles before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Iteration ceiling for repetitions without an upper bound.
pub const DEFAULT_REPEAT_CAP: u32 = 20;

/// Configuration for pattern generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    /// Probability of generating another copy once a repetition reached `min`.
    pub continue_probability: f64,
    /// Maximum number of attempts made by the attempt loop.
    pub max_attempts: usize,
    /// Upper bound used in place of an unbounded repetition maximum.
    pub repeat_cap: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            continue_probability: DEFAULT_CONTINUE_PROBABILITY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            repeat_cap: DEFAULT_REPEAT_CAP,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.continue_probability) {
            return Err(Error::InvalidProbability(self.continue_probability));
        }
        if self.repeat_cap > MAX_REPEAT_COUNT {
            return Err(Error::InvalidRepeatCap(self.repeat_cap));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(GeneratorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        for p in [-0.1, 1.5, f64::NAN] {
            let config = GeneratorConfig {
                continue_probability: p,
                ..GeneratorConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidProbability(_))
            ));
        }
    }

    #[test]
    fn repeat_cap_is_bounded() {
        let at_limit = GeneratorConfig {
            repeat_cap: MAX_REPEAT_COUNT,
            ..GeneratorConfig::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
        let above = GeneratorConfig {
            repeat_cap: MAX_REPEAT_COUNT + 1,
            ..GeneratorConfig::default()
        };
        assert_eq!(
            above.validate(),
            Err(Error::InvalidRepeatCap(MAX_REPEAT_COUNT + 1))
        );
    }
}
