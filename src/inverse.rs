//! Pattern text in, verified random matches out.

use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::Error;
use crate::generate::Generator;
use crate::regex::Regex;
use crate::trace::{NoopTracer, Tracer};

/// A pattern ready for generation, with its verifier compiled alongside.
#[derive(Debug, Clone)]
pub struct InverseRegex {
    regex: Regex,
    config: GeneratorConfig,
}

impl InverseRegex {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Self::with_config(pattern, GeneratorConfig::default())
    }

    pub fn with_config(pattern: &str, config: GeneratorConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            regex: Regex::new(pattern)?,
            config,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// A random string that fully matches the pattern.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<String, Error> {
        self.generate_traced(rng, &mut NoopTracer)
    }

    pub fn generate_traced<R: Rng, T: Tracer>(
        &self,
        rng: &mut R,
        tracer: &mut T,
    ) -> Result<String, Error> {
        let mut generator = Generator::new(rng, self.config)?;
        generator.generate_matching(
            &self.regex.pattern().sequence,
            |candidate| self.regex.is_match(candidate),
            tracer,
        )
    }
}

/// Parse `pattern` and generate one match with the thread-local RNG.
pub fn random_from_pattern(pattern: &str) -> Result<String, Error> {
    InverseRegex::new(pattern)?.generate(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn literal_pattern_first_try() {
        let inv = InverseRegex::new("xy").expect("parses");
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(inv.generate(&mut rng), Ok("xy".to_string()));
    }

    #[test]
    fn parse_errors_surface() {
        assert_eq!(
            InverseRegex::new("[a").map(|_| ()),
            Err(Error::Parse(ParseError::UnterminatedClass { pos: 0 }))
        );
    }

    #[test]
    fn bad_config_is_rejected_up_front() {
        let config = GeneratorConfig {
            continue_probability: -1.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            InverseRegex::with_config("x", config),
            Err(Error::InvalidProbability(_))
        ));
    }

    #[test]
    fn random_from_pattern_verifies() {
        let out = random_from_pattern("[A-Z][a-z]*( [a-z]+)*\\.").expect("generates");
        assert!(Regex::new("[A-Z][a-z]*( [a-z]+)*\\.").expect("parses").is_match(&out));
    }
}
