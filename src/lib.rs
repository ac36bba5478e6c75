//! # Inverse regular expressions
//!
//! Given a pattern, produce random strings that match it.
//!
//! ```text
//! pattern text → Parser → AST ─┬─→ Generator ──→ candidate ─┐
//!                              └─→ Compiler → VM ←──────────┘ verify, retry
//! ```
//!
//! 1. [`parser`] builds the [`ast::Pattern`].
//! 2. [`generate`] walks the AST with a random source. It never backtracks:
//!    zero-width assertions generate nothing and a backreference to a group
//!    that has not been generated aborts the attempt.
//! 3. [`compiler`] and [`vm`] form an independent backtracking matcher that
//!    checks each candidate against the whole pattern.
//! 4. [`attempt`] retries up to [`GeneratorConfig::max_attempts`] times and
//!    only ever returns verified strings.
//!
//! Not every matching string is reachable, and the output is not uniformly
//! distributed over the matches. Lookaround and inline flags are rejected by
//! the parser.
//!
//! ```no_run
//! let s = reinv::random_from_pattern("(cat |dog )\\1").unwrap();
//! assert!(s == "cat cat " || s == "dog dog ");
//! ```

pub mod ast;
pub mod attempt;
pub mod category;
pub mod compiler;
pub mod config;
pub mod env;
pub mod error;
pub mod generate;
pub mod inverse;
pub mod parser;
pub mod regex;
pub mod selfcheck;
pub mod trace;
pub mod vm;

pub use config::GeneratorConfig;
pub use error::Error;
pub use generate::{GenerateError, Generator};
pub use inverse::{InverseRegex, random_from_pattern};
pub use regex::Regex;
