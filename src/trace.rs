//! Tracing hooks for the attempt loop.
//!
//! The loop reports through a [`Tracer`]. [`NoopTracer`] compiles to nothing;
//! [`PrintTracer`] writes one line per event to a writer (stderr by default).

use std::io::{self, Write};

use crate::generate::GenerateError;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Rejected attempts and exhaustion only.
    #[default]
    Default,
    /// Every attempt and every candidate (-v).
    Verbose,
}

/// Attempt loop instrumentation.
pub trait Tracer {
    /// Called before each attempt. `attempt` starts at 1.
    fn trace_attempt(&mut self, attempt: usize);

    /// Called when generation aborted the attempt.
    fn trace_aborted(&mut self, attempt: usize, error: &GenerateError);

    /// Called after the verifier judged a candidate.
    fn trace_candidate(&mut self, attempt: usize, candidate: &str, verified: bool);

    /// Called once when all attempts failed.
    fn trace_exhausted(&mut self, attempts: usize);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_attempt(&mut self, _attempt: usize) {}

    #[inline(always)]
    fn trace_aborted(&mut self, _attempt: usize, _error: &GenerateError) {}

    #[inline(always)]
    fn trace_candidate(&mut self, _attempt: usize, _candidate: &str, _verified: bool) {}

    #[inline(always)]
    fn trace_exhausted(&mut self, _attempts: usize) {}
}

/// Line-oriented tracer.
pub struct PrintTracer<W: Write = io::Stderr> {
    out: W,
    verbosity: Verbosity,
}

impl PrintTracer {
    pub fn stderr(verbosity: Verbosity) -> Self {
        Self::new(io::stderr(), verbosity)
    }
}

impl<W: Write> PrintTracer<W> {
    pub fn new(out: W, verbosity: Verbosity) -> Self {
        Self { out, verbosity }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Trace output is best effort; a broken pipe must not fail generation.
    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{args}");
    }
}

impl<W: Write> Tracer for PrintTracer<W> {
    fn trace_attempt(&mut self, attempt: usize) {
        if self.verbosity >= Verbosity::Verbose {
            self.line(format_args!("attempt {attempt}"));
        }
    }

    fn trace_aborted(&mut self, attempt: usize, error: &GenerateError) {
        self.line(format_args!("attempt {attempt}: aborted: {error}"));
    }

    fn trace_candidate(&mut self, attempt: usize, candidate: &str, verified: bool) {
        if verified {
            if self.verbosity >= Verbosity::Verbose {
                self.line(format_args!(
                    "attempt {attempt}: accepted \"{}\"",
                    candidate.escape_debug()
                ));
            }
        } else {
            self.line(format_args!(
                "attempt {attempt}: rejected \"{}\"",
                candidate.escape_debug()
            ));
        }
    }

    fn trace_exhausted(&mut self, attempts: usize) {
        self.line(format_args!("gave up after {attempts} attempts"));
    }
}
