//! Sample driver: generates a few matches for a battery of patterns.

use std::io::Write;

use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::Error;
use crate::inverse::InverseRegex;

pub const SAMPLE_PATTERNS: &[&str] = &[
    "foo$foo",
    "x",
    "xy",
    "x|y",
    "x|y|z",
    "[abc]",
    "[a-z]",
    "[A-Z]",
    "cat|dog",
    "cat|dog|mouse",
    "c[aeiou]t|d[aeiou]g|mouse",
    "x*",
    "y+",
    "(cat |dog )*",
    "(cat |dog )(\\1)*",
    "-?[0-9]+\\.[0-9]{2}",
    "-?\\d+\\.\\d\\d",
    ".*foo.*",
    "\\w+( \\w+)*",
    "[A-Z][a-z]*( [a-z]+)*\\.",
    "( [aeiouAEIOU]?([bcdfghjklmnpqrstvwxyz][aeiou]){1,4})+",
    "(( [aeiouAEIOU]?([bcdfghjklmnpqrstvwxyz][aeiou]){1,4})\\2?)+",
    "<[a-z<>]*>",
    "<[a-z<>]*?>",
    "Since (?P<big>cats|dogs) chase (?P<small>mice|squirrels|elephants), (?P=small) dislike (?P=big)\\.",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub generated: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SelfCheckError {
    #[error("{0}")]
    Engine(#[from] Error),

    #[error("generated \"{candidate}\" does not match {pattern}")]
    Unverified { pattern: String, candidate: String },

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Generate `samples` strings per pattern and print them to `out`.
///
/// Exhausted generations print `failed!`. Every printed string is checked
/// again against the pattern.
pub fn run<R: Rng, W: Write>(
    patterns: &[&str],
    samples: usize,
    config: GeneratorConfig,
    rng: &mut R,
    out: &mut W,
) -> Result<Summary, SelfCheckError> {
    let mut summary = Summary::default();
    for &pattern in patterns {
        let inv = InverseRegex::with_config(pattern, config)?;
        writeln!(out, "\nMatches for {pattern}:")?;
        for _ in 0..samples {
            match inv.generate(rng) {
                Ok(candidate) => {
                    if !inv.regex().is_match(&candidate) {
                        return Err(SelfCheckError::Unverified {
                            pattern: pattern.to_owned(),
                            candidate,
                        });
                    }
                    summary.generated += 1;
                    writeln!(out, "    {}", candidate.escape_debug())?;
                }
                Err(Error::GenerationExhausted { .. }) => {
                    summary.failed += 1;
                    writeln!(out, "    failed!")?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_sample_pattern_parses() {
        for pattern in SAMPLE_PATTERNS {
            assert!(InverseRegex::new(pattern).is_ok(), "{pattern}");
        }
    }

    #[test]
    fn unsatisfiable_pattern_reports_failures() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut out = Vec::new();
        let summary = run(
            &["foo$foo"],
            3,
            GeneratorConfig::default(),
            &mut rng,
            &mut out,
        )
        .expect("self-check runs");
        assert_eq!(summary, Summary { generated: 0, failed: 3 });
        let text = String::from_utf8(out).expect("utf-8");
        assert_eq!(text, "\nMatches for foo$foo:\n    failed!\n    failed!\n    failed!\n");
    }

    #[test]
    fn full_battery_runs() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut out = Vec::new();
        let summary = run(
            SAMPLE_PATTERNS,
            5,
            GeneratorConfig::default(),
            &mut rng,
            &mut out,
        )
        .expect("self-check runs");
        // Only foo$foo is unsatisfiable; everything else verifies.
        assert_eq!(summary.failed, 5);
        assert_eq!(summary.generated, (SAMPLE_PATTERNS.len() - 1) * 5);
    }
}
