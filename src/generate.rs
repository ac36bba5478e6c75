//! Node generator: random text for one AST node or sequence.
//!
//! Generation never backtracks. Each node picks once and moves on; the
//! attempt loop (see [`crate::attempt`]) verifies the result afterwards and
//! retries when the picks turned out inconsistent.

use rand::Rng;
use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;

use crate::ast::{ClassItem, Node, class_matches, effective_max};
use crate::category::{alphabet, any_chars};
use crate::config::GeneratorConfig;
use crate::env::Bindings;
use crate::error::Error;

/// Why a single attempt could not produce a candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// Backreference to a group that has no binding yet.
    #[error("group {index} not matched")]
    UngeneratedGroup { index: usize },

    /// A class, range or branch offered nothing to pick.
    #[error("nothing to choose from")]
    NoCandidates,
}

/// Generated text plus the environment after generating it.
pub type Generated = (String, Bindings);

/// Random string generator over the pattern AST.
pub struct Generator<R> {
    rng: R,
    config: GeneratorConfig,
    keep_going: Bernoulli,
}

impl<R: Rng> Generator<R> {
    pub fn new(rng: R, config: GeneratorConfig) -> Result<Self, Error> {
        config.validate()?;
        let keep_going = Bernoulli::new(config.continue_probability)
            .map_err(|_| Error::InvalidProbability(config.continue_probability))?;
        Ok(Self {
            rng,
            config,
            keep_going,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Generate every node of `seq` left to right, threading bindings through.
    pub fn generate_sequence(
        &mut self,
        seq: &[Node],
        env: Bindings,
    ) -> Result<Generated, GenerateError> {
        let mut out = String::new();
        let mut env = env;
        for node in seq {
            let (text, next) = self.generate(node, env)?;
            out.push_str(&text);
            env = next;
        }
        Ok((out, env))
    }

    /// Generate text for a single node.
    pub fn generate(&mut self, node: &Node, env: Bindings) -> Result<Generated, GenerateError> {
        match node {
            Node::Literal(ch) => Ok((ch.to_string(), env)),
            Node::Any => Ok((self.pick(any_chars())?.to_string(), env)),
            // Assertions are left to the verifier.
            Node::At(_) => Ok((String::new(), env)),
            Node::CharClass { negated: false, items } => {
                let item = *items.choose(&mut self.rng).ok_or(GenerateError::NoCandidates)?;
                self.generate(&Node::from(item), env)
            }
            Node::CharClass {
                negated: true,
                items,
            } => Ok((self.negated_class_char(items)?.to_string(), env)),
            Node::Range(lo, hi) => {
                if lo > hi {
                    return Err(GenerateError::NoCandidates);
                }
                let ch: char = self.rng.gen_range(*lo..=*hi);
                Ok((ch.to_string(), env))
            }
            Node::Branch(arms) => {
                let arm = arms.choose(&mut self.rng).ok_or(GenerateError::NoCandidates)?;
                self.generate_sequence(arm, env)
            }
            Node::Repeat { min, max, body, .. } => self.generate_repeat(*min, *max, body, env),
            Node::Subpattern { index, body } => {
                let (text, env) = self.generate_sequence(body, env)?;
                let env = match index {
                    Some(index) => env.bind(*index, &text),
                    None => env,
                };
                Ok((text, env))
            }
            Node::GroupRef(index) => match env.lookup(*index).map(str::to_owned) {
                Some(text) => Ok((text, env)),
                None => Err(GenerateError::UngeneratedGroup { index: *index }),
            },
            Node::Category(cat) => Ok((self.pick(cat.chars())?.to_string(), env)),
        }
    }

    /// Once `min` copies exist, each further copy happens with the configured
    /// continue probability. Never more than the effective maximum.
    fn generate_repeat(
        &mut self,
        min: u32,
        max: u32,
        body: &[Node],
        env: Bindings,
    ) -> Result<Generated, GenerateError> {
        let hi = effective_max(min, max, self.config.repeat_cap);
        let mut out = String::new();
        let mut env = env;
        for count in 0..hi {
            if count >= min && !self.rng.sample(self.keep_going) {
                break;
            }
            let (text, next) = self.generate_sequence(body, env)?;
            out.push_str(&text);
            env = next;
        }
        Ok((out, env))
    }

    fn negated_class_char(&mut self, items: &[ClassItem]) -> Result<char, GenerateError> {
        let allowed: Vec<char> = alphabet()
            .filter(|&ch| class_matches(ch, items, true))
            .collect();
        self.pick(&allowed)
    }

    fn pick(&mut self, chars: &[char]) -> Result<char, GenerateError> {
        chars
            .choose(&mut self.rng)
            .copied()
            .ok_or(GenerateError::NoCandidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AtKind, MAX_REPEAT, Sequence};
    use crate::category::Category;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator(seed: u64) -> Generator<StdRng> {
        Generator::new(StdRng::seed_from_u64(seed), GeneratorConfig::default())
            .expect("default config is valid")
    }

    fn run(seq: &[Node], seed: u64) -> Result<String, GenerateError> {
        generator(seed)
            .generate_sequence(seq, Bindings::new())
            .map(|(text, _)| text)
    }

    fn lit(s: &str) -> Sequence {
        s.chars().map(Node::Literal).collect()
    }

    #[test]
    fn empty_sequence_is_empty_and_keeps_env() {
        let env = Bindings::new().bind(1, "x");
        let (text, env) = generator(1)
            .generate_sequence(&[], env)
            .expect("empty sequence generates");
        assert_eq!(text, "");
        assert_eq!(env.lookup(1), Some("x"));
    }

    #[test]
    fn literals_are_reproduced() {
        assert_eq!(run(&lit("hello"), 7).as_deref(), Ok("hello"));
    }

    #[test]
    fn assertions_generate_nothing() {
        let seq = vec![
            Node::At(AtKind::Start),
            Node::Literal('a'),
            Node::At(AtKind::WordBoundary),
            Node::At(AtKind::End),
        ];
        assert_eq!(run(&seq, 3).as_deref(), Ok("a"));
    }

    #[test]
    fn class_picks_one_item() {
        let seq = vec![Node::CharClass {
            negated: false,
            items: vec![
                ClassItem::Literal('a'),
                ClassItem::Range('x', 'z'),
                ClassItem::Category(Category::Digit),
            ],
        }];
        for seed in 0..200 {
            let text = run(&seq, seed).expect("class generates");
            let ch = text.chars().next().expect("one char");
            assert_eq!(text.chars().count(), 1);
            assert!(ch == 'a' || ('x'..='z').contains(&ch) || ch.is_ascii_digit());
        }
    }

    #[test]
    fn negated_class_avoids_items() {
        let items = vec![ClassItem::Range('\0', 'y')];
        let seq = vec![Node::CharClass {
            negated: true,
            items: items.clone(),
        }];
        for seed in 0..100 {
            let ch = run(&seq, seed).expect("class generates").chars().next();
            let ch = ch.expect("one char");
            assert!(ch > 'y' && ch <= '\u{ff}');
        }
    }

    #[test]
    fn negated_class_covering_alphabet_has_no_candidates() {
        let seq = vec![Node::CharClass {
            negated: true,
            items: vec![ClassItem::Range('\0', '\u{ff}')],
        }];
        assert_eq!(run(&seq, 0), Err(GenerateError::NoCandidates));
    }

    #[test]
    fn any_never_produces_newline() {
        let seq = vec![Node::Any; 64];
        for seed in 0..20 {
            let text = run(&seq, seed).expect("any generates");
            assert_eq!(text.chars().count(), 64);
            assert!(!text.contains('\n'));
        }
    }

    #[test]
    fn branch_takes_one_arm_and_sees_all() {
        let seq = vec![Node::Branch(vec![lit("a"), lit("b"), lit("c")])];
        let mut g = generator(11);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            let (text, _) = g
                .generate_sequence(&seq, Bindings::new())
                .expect("branch generates");
            assert!(["a", "b", "c"].contains(&text.as_str()));
            seen.insert(text);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn zero_repeat_is_empty() {
        let seq = vec![Node::Repeat {
            min: 0,
            max: 0,
            greedy: true,
            body: lit("x"),
        }];
        for seed in 0..20 {
            assert_eq!(run(&seq, seed).as_deref(), Ok(""));
        }
    }

    #[test]
    fn unbounded_repeat_respects_cap() {
        let config = GeneratorConfig {
            continue_probability: 1.0,
            repeat_cap: 10,
            ..GeneratorConfig::default()
        };
        let mut g = Generator::new(StdRng::seed_from_u64(5), config).expect("valid config");
        let seq = vec![Node::Repeat {
            min: 0,
            max: MAX_REPEAT,
            greedy: true,
            body: lit("x"),
        }];
        let (text, _) = g
            .generate_sequence(&seq, Bindings::new())
            .expect("repeat generates");
        assert_eq!(text, "x".repeat(10));
    }

    #[test]
    fn repeat_stops_at_min_when_never_continuing() {
        let config = GeneratorConfig {
            continue_probability: 0.0,
            ..GeneratorConfig::default()
        };
        let mut g = Generator::new(StdRng::seed_from_u64(5), config).expect("valid config");
        let seq = vec![Node::Repeat {
            min: 3,
            max: MAX_REPEAT,
            greedy: false,
            body: lit("ab"),
        }];
        let (text, _) = g
            .generate_sequence(&seq, Bindings::new())
            .expect("repeat generates");
        assert_eq!(text, "ababab");
    }

    #[test]
    fn capture_binds_and_backreference_reuses() {
        let seq = vec![
            Node::Subpattern {
                index: Some(1),
                body: vec![Node::Branch(vec![lit("cat "), lit("dog ")])],
            },
            Node::GroupRef(1),
        ];
        for seed in 0..50 {
            let text = run(&seq, seed).expect("backreference resolves");
            assert!(text == "cat cat " || text == "dog dog ", "{text}");
        }
    }

    #[test]
    fn non_capturing_subpattern_binds_nothing() {
        let seq = vec![Node::Subpattern {
            index: None,
            body: lit("ab"),
        }];
        let (text, env) = generator(0)
            .generate_sequence(&seq, Bindings::new())
            .expect("subpattern generates");
        assert_eq!(text, "ab");
        assert!(env.is_empty());
    }

    #[test]
    fn forward_reference_fails_the_attempt() {
        let seq = vec![
            Node::GroupRef(1),
            Node::Subpattern {
                index: Some(1),
                body: lit("a"),
            },
        ];
        assert_eq!(
            run(&seq, 0),
            Err(GenerateError::UngeneratedGroup { index: 1 })
        );
    }

    #[test]
    fn binding_inside_unchosen_arm_is_not_visible() {
        // (?:(a)|b)\1 : the reference resolves only when the first arm ran.
        let seq = vec![
            Node::Branch(vec![
                vec![Node::Subpattern {
                    index: Some(1),
                    body: lit("a"),
                }],
                lit("b"),
            ]),
            Node::GroupRef(1),
        ];
        let mut g = generator(9);
        let mut outcomes = std::collections::BTreeSet::new();
        for _ in 0..100 {
            match g.generate_sequence(&seq, Bindings::new()) {
                Ok((text, _)) => {
                    assert_eq!(text, "aa");
                    outcomes.insert("ok");
                }
                Err(err) => {
                    assert_eq!(err, GenerateError::UngeneratedGroup { index: 1 });
                    outcomes.insert("err");
                }
            }
        }
        assert_eq!(outcomes.len(), 2);
    }

    #[test]
    fn same_seed_same_output() {
        let seq = vec![
            Node::Category(Category::Word),
            Node::Repeat {
                min: 1,
                max: MAX_REPEAT,
                greedy: true,
                body: vec![Node::Any],
            },
        ];
        assert_eq!(run(&seq, 42), run(&seq, 42));
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let config = GeneratorConfig {
            continue_probability: 2.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            Generator::new(StdRng::seed_from_u64(0), config),
            Err(Error::InvalidProbability(_))
        ));
    }
}
