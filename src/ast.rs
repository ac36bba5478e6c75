//! Pattern syntax tree consumed by the generator and the verifier.

use crate::category::Category;

/// Upper bound written for `*`, `+` and `{n,}`.
///
/// This is an ordinary number, not an "infinite" marker: the generator clamps
/// it to the configured repeat cap, the compiler lowers it to a loop.
pub const MAX_REPEAT: u32 = u32::MAX;

/// Largest repetition count a pattern may spell out, and the largest
/// accepted repeat cap.
pub const MAX_REPEAT_COUNT: u32 = 65_535;

/// An ordered list of nodes, generated and matched left to right.
pub type Sequence = Vec<Node>;

/// A single node in the pattern AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Matches exactly one character.
    Literal(char),
    /// Matches any character of the alphabet except newline.
    Any,
    /// Zero-width assertion. Generated as the empty string.
    At(AtKind),
    /// Character class like `[abc]`, `[a-z\d]`, `[^abc]`.
    CharClass { negated: bool, items: Vec<ClassItem> },
    /// One character in `low..=high`.
    Range(char, char),
    /// Alternation: exactly one arm is taken.
    Branch(Vec<Sequence>),
    /// `body` repeated between `min` and `max` times.
    Repeat {
        min: u32,
        max: u32,
        greedy: bool,
        body: Sequence,
    },
    /// Parenthesized group. `index` is `None` for `(?:...)`.
    Subpattern { index: Option<usize>, body: Sequence },
    /// Backreference to a capture group.
    GroupRef(usize),
    /// Shorthand class: `\d`, `\w`, `\s` and their negations.
    Category(Category),
}

/// Item within a character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    Literal(char),
    Range(char, char),
    Category(Category),
}

impl ClassItem {
    pub fn matches(self, ch: char) -> bool {
        match self {
            ClassItem::Literal(c) => ch == c,
            ClassItem::Range(lo, hi) => lo <= ch && ch <= hi,
            ClassItem::Category(cat) => cat.matches(ch),
        }
    }
}

impl From<ClassItem> for Node {
    fn from(item: ClassItem) -> Self {
        match item {
            ClassItem::Literal(ch) => Node::Literal(ch),
            ClassItem::Range(lo, hi) => Node::Range(lo, hi),
            ClassItem::Category(cat) => Node::Category(cat),
        }
    }
}

/// Check if a character matches a class, honoring negation.
pub fn class_matches(ch: char, items: &[ClassItem], negated: bool) -> bool {
    let matched = items.iter().any(|item| item.matches(ch));
    matched != negated
}

/// Zero-width assertion kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtKind {
    /// `^`
    Start,
    /// `$`
    End,
    /// `\A`
    StartText,
    /// `\Z`, `\z`
    EndText,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
}

/// Upper repetition bound after resolving [`MAX_REPEAT`] against `cap`.
///
/// A cap below `min` is raised to `min` so the bound stays satisfiable.
pub fn effective_max(min: u32, max: u32, cap: u32) -> u32 {
    if max == MAX_REPEAT { cap.max(min) } else { max }
}

/// A parsed pattern: the root sequence and the number of capture groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub sequence: Sequence,
    pub group_count: usize,
}
