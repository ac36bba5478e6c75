//! Errors surfaced to callers of the engine.

use crate::ast::MAX_REPEAT_COUNT;
use crate::parser::ParseError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("pattern parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid continue probability {0}: expected a value in [0, 1]")]
    InvalidProbability(f64),

    #[error("repeat cap {0} exceeds {max}", max = MAX_REPEAT_COUNT)]
    InvalidRepeatCap(u32),

    /// Every permitted attempt failed verification or hit an unbound group.
    #[error("failed to generate a matching string after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}
