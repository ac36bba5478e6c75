//! Attempt loop: generate a candidate, verify it, retry on failure.

use rand::Rng;

use crate::ast::Node;
use crate::env::Bindings;
use crate::error::Error;
use crate::generate::Generator;
use crate::trace::Tracer;

impl<R: Rng> Generator<R> {
    /// Run up to `max_attempts` generate-then-verify cycles over `pattern`.
    ///
    /// Each attempt starts from an empty environment. An attempt that hits an
    /// unbound group or an empty choice counts as failed, as does a candidate
    /// `verify` rejects. Only verified candidates are returned.
    pub fn generate_matching<V, T>(
        &mut self,
        pattern: &[Node],
        mut verify: V,
        tracer: &mut T,
    ) -> Result<String, Error>
    where
        V: FnMut(&str) -> bool,
        T: Tracer,
    {
        let attempts = self.config().max_attempts;
        for attempt in 1..=attempts {
            tracer.trace_attempt(attempt);
            match self.generate_sequence(pattern, Bindings::new()) {
                Ok((candidate, _)) => {
                    let verified = verify(&candidate);
                    tracer.trace_candidate(attempt, &candidate, verified);
                    if verified {
                        return Ok(candidate);
                    }
                }
                Err(err) => tracer.trace_aborted(attempt, &err),
            }
        }
        tracer.trace_exhausted(attempts);
        Err(Error::GenerationExhausted { attempts })
    }
}
