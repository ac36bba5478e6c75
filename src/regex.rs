//! Compiled pattern used as the ground-truth verifier.

use crate::ast::Pattern;
use crate::compiler::{Program, compile};
use crate::parser::{ParseError, parse};
use crate::vm::{self, MatchResult};

#[derive(Debug, Clone)]
pub struct Regex {
    source: String,
    pattern: Pattern,
    program: Program,
}

impl Regex {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let pattern = parse(source)?;
        let program = compile(&pattern);
        Ok(Self {
            source: source.to_owned(),
            pattern,
            program,
        })
    }

    /// The pattern text this regex was built from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Whether `input` matches the whole pattern, anchored at both ends.
    pub fn is_match(&self, input: &str) -> bool {
        vm::full_match(&self.program, input).is_some()
    }

    /// Capture spans of a full match.
    pub fn captures(&self, input: &str) -> Option<MatchResult> {
        vm::full_match(&self.program, input)
    }
}
