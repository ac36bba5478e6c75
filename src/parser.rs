//! Pattern parser: converts pattern text into a [`Pattern`].

use crate::ast::*;
use crate::category::Category;

/// Why a pattern could not be parsed. Positions are char offsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("expected '{expected}' at position {pos}")]
    Expected { expected: char, pos: usize },

    #[error("unexpected end of pattern")]
    UnexpectedEnd,

    #[error("nothing to repeat at position {pos}")]
    NothingToRepeat { pos: usize },

    #[error("min repeat greater than max repeat at position {pos}")]
    BadRepeat { pos: usize },

    #[error("repetition number above {max} at position {pos}", max = MAX_REPEAT_COUNT)]
    RepeatTooLarge { pos: usize },

    #[error("bad character range {lo}-{hi} at position {pos}")]
    BadRange { lo: char, hi: char, pos: usize },

    #[error("unterminated character class at position {pos}")]
    UnterminatedClass { pos: usize },

    #[error("bad escape at position {pos}")]
    BadEscape { pos: usize },

    #[error("invalid group syntax at position {pos}")]
    BadGroup { pos: usize },

    #[error("bad group name at position {pos}")]
    BadGroupName { pos: usize },

    #[error("unknown group name '{name}' at position {pos}")]
    UnknownGroupName { name: String, pos: usize },

    #[error("redefinition of group name '{name}' at position {pos}")]
    DuplicateGroupName { name: String, pos: usize },

    #[error("{construct} is not supported (position {pos})")]
    Unsupported { construct: &'static str, pos: usize },
}

pub struct Parser {
    chars: Vec<char>,
    pos: usize,
    group_count: usize,
    names: Vec<(String, usize)>,
}

impl Parser {
    pub fn new(pattern: &str) -> Self {
        Parser {
            chars: pattern.chars().collect(),
            pos: 0,
            group_count: 0,
            names: Vec::new(),
        }
    }

    /// Parse the full pattern.
    pub fn parse(mut self) -> Result<Pattern, ParseError> {
        let sequence = self.parse_alternation()?;
        if let Some(ch) = self.peek() {
            return Err(ParseError::UnexpectedChar { ch, pos: self.pos });
        }
        Ok(Pattern {
            sequence,
            group_count: self.group_count,
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(_) => Err(ParseError::Expected {
                expected,
                pos: self.pos - 1,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Parse alternation: `a|b|c`
    fn parse_alternation(&mut self) -> Result<Sequence, ParseError> {
        let mut arms = vec![self.parse_concat()?];
        while self.eat('|') {
            arms.push(self.parse_concat()?);
        }
        if arms.len() == 1 {
            Ok(arms.swap_remove(0))
        } else {
            Ok(vec![Node::Branch(arms)])
        }
    }

    /// Parse concatenation: `abc`
    fn parse_concat(&mut self) -> Result<Sequence, ParseError> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == '|' {
                break;
            }
            nodes.push(self.parse_quantified()?);
        }
        Ok(nodes)
    }

    /// Parse an atom possibly followed by a quantifier.
    fn parse_quantified(&mut self) -> Result<Node, ParseError> {
        let node = self.parse_atom()?;
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some('*') => {
                self.advance();
                (0, MAX_REPEAT)
            }
            Some('+') => {
                self.advance();
                (1, MAX_REPEAT)
            }
            Some('?') => {
                self.advance();
                (0, 1)
            }
            Some('{') => match self.parse_brace_quantifier() {
                Some((min, max)) => (
                    min.map_or(Ok(0), |n| repeat_count(n, start))?,
                    max.map_or(Ok(MAX_REPEAT), |n| repeat_count(n, start))?,
                ),
                // Not a quantifier: the '{' is a literal and is parsed next.
                None => return Ok(node),
            },
            _ => return Ok(node),
        };
        if min > max {
            return Err(ParseError::BadRepeat { pos: start });
        }
        let greedy = !self.eat('?');
        Ok(Node::Repeat {
            min,
            max,
            greedy,
            body: vec![node],
        })
    }

    /// Parse `{n}`, `{n,}`, `{n,m}`, `{,m}`. A missing bound is `None`.
    /// Restores the position and returns `None` when the braces do not form
    /// a quantifier.
    fn parse_brace_quantifier(&mut self) -> Option<(Option<u64>, Option<u64>)> {
        let save_pos = self.pos;
        let bounds = self.try_parse_brace_contents();
        if bounds.is_none() {
            self.pos = save_pos;
        }
        bounds
    }

    fn try_parse_brace_contents(&mut self) -> Option<(Option<u64>, Option<u64>)> {
        self.advance(); // consume '{'
        let min = self.parse_number();
        let max = if self.eat(',') {
            self.parse_number()
        } else {
            Some(min?)
        };
        self.eat('}').then_some((min, max))
    }

    /// Digits at the current position; saturates instead of overflowing so
    /// oversized counts still reach the range check.
    fn parse_number(&mut self) -> Option<u64> {
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        if self.pos == start {
            return None;
        }
        let s: String = self.chars[start..self.pos].iter().collect();
        Some(s.parse::<u64>().unwrap_or(u64::MAX))
    }

    /// Parse a single atom (literal, class, group, anchor, etc.)
    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some('(') => self.parse_group(),
            Some('[') => self.parse_char_class(),
            Some('.') => {
                self.advance();
                Ok(Node::Any)
            }
            Some('^') => {
                self.advance();
                Ok(Node::At(AtKind::Start))
            }
            Some('$') => {
                self.advance();
                Ok(Node::At(AtKind::End))
            }
            Some('\\') => self.parse_escape(),
            Some('*' | '+' | '?') => Err(ParseError::NothingToRepeat { pos: self.pos }),
            Some(ch) => {
                self.advance();
                Ok(Node::Literal(ch))
            }
        }
    }

    /// Parse an escape sequence outside a class.
    fn parse_escape(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.advance(); // consume '\\'
        let node = match self.advance() {
            None => return Err(ParseError::UnexpectedEnd),
            Some('A') => Node::At(AtKind::StartText),
            Some('Z' | 'z') => Node::At(AtKind::EndText),
            Some('b') => Node::At(AtKind::WordBoundary),
            Some('B') => Node::At(AtKind::NonWordBoundary),
            Some(ch @ '1'..='9') => {
                let mut index = ch as usize - '0' as usize;
                if let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
                    self.advance();
                    index = index * 10 + d as usize;
                }
                Node::GroupRef(index)
            }
            Some(ch) => match self.escape_item(ch, start)? {
                ClassItem::Category(cat) => Node::Category(cat),
                ClassItem::Literal(c) => Node::Literal(c),
                ClassItem::Range(lo, hi) => Node::Range(lo, hi),
            },
        };
        Ok(node)
    }

    /// Escapes shared between classes and plain atoms. `ch` is the char after
    /// the backslash, already consumed.
    fn escape_item(&mut self, ch: char, start: usize) -> Result<ClassItem, ParseError> {
        let item = match ch {
            'd' => ClassItem::Category(Category::Digit),
            'D' => ClassItem::Category(Category::NotDigit),
            'w' => ClassItem::Category(Category::Word),
            'W' => ClassItem::Category(Category::NotWord),
            's' => ClassItem::Category(Category::Space),
            'S' => ClassItem::Category(Category::NotSpace),
            'n' => ClassItem::Literal('\n'),
            'r' => ClassItem::Literal('\r'),
            't' => ClassItem::Literal('\t'),
            'f' => ClassItem::Literal('\x0c'),
            'v' => ClassItem::Literal('\x0b'),
            'a' => ClassItem::Literal('\x07'),
            '0' => ClassItem::Literal('\0'),
            'x' => ClassItem::Literal(self.parse_hex_escape(start)?),
            // Escaped metacharacters and punctuation stand for themselves.
            c if !c.is_ascii_alphanumeric() => ClassItem::Literal(c),
            _ => return Err(ParseError::BadEscape { pos: start }),
        };
        Ok(item)
    }

    /// `\xHH`: exactly two hex digits.
    fn parse_hex_escape(&mut self, start: usize) -> Result<char, ParseError> {
        let hi = self.advance().and_then(|c| c.to_digit(16));
        let lo = self.advance().and_then(|c| c.to_digit(16));
        match (hi, lo) {
            (Some(hi), Some(lo)) => char::from_u32(hi * 16 + lo).ok_or(ParseError::BadEscape { pos: start }),
            _ => Err(ParseError::BadEscape { pos: start }),
        }
    }

    /// Parse a group: `(...)`, `(?:...)`, `(?P<name>...)`, `(?<name>...)`,
    /// `(?P=name)`.
    fn parse_group(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.advance(); // consume '('

        if !self.eat('?') {
            return self.parse_capture(start, None);
        }

        match self.peek() {
            Some(':') => {
                self.advance();
                let body = self.parse_alternation()?;
                self.expect(')')?;
                Ok(Node::Subpattern { index: None, body })
            }
            Some('P') if self.peek_at(1) == Some('<') => {
                self.pos += 2;
                let name = self.parse_group_name('>')?;
                self.parse_capture(start, Some(name))
            }
            Some('P') if self.peek_at(1) == Some('=') => {
                self.pos += 2;
                let name_pos = self.pos;
                let name = self.parse_group_name(')')?;
                self.names
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|&(_, index)| Node::GroupRef(index))
                    .ok_or(ParseError::UnknownGroupName {
                        name,
                        pos: name_pos,
                    })
            }
            Some('<') if matches!(self.peek_at(1), Some('=' | '!')) => Err(ParseError::Unsupported {
                construct: "lookbehind",
                pos: start,
            }),
            Some('<') => {
                self.advance();
                let name = self.parse_group_name('>')?;
                self.parse_capture(start, Some(name))
            }
            Some('=' | '!') => Err(ParseError::Unsupported {
                construct: "lookahead",
                pos: start,
            }),
            Some(c) if c.is_ascii_alphabetic() || c == '-' => Err(ParseError::Unsupported {
                construct: "inline flags",
                pos: start,
            }),
            _ => Err(ParseError::BadGroup { pos: self.pos }),
        }
    }

    /// Capturing group body, after the opening syntax has been consumed.
    fn parse_capture(&mut self, start: usize, name: Option<String>) -> Result<Node, ParseError> {
        self.group_count += 1;
        let index = self.group_count;
        if let Some(name) = name {
            if self.names.iter().any(|(n, _)| *n == name) {
                return Err(ParseError::DuplicateGroupName { name, pos: start });
            }
            self.names.push((name, index));
        }
        let body = self.parse_alternation()?;
        self.expect(')')?;
        Ok(Node::Subpattern {
            index: Some(index),
            body,
        })
    }

    /// Identifier up to (and consuming) `terminator`.
    fn parse_group_name(&mut self, terminator: char) -> Result<String, ParseError> {
        let start = self.pos;
        let mut name = String::new();
        loop {
            match self.advance() {
                None => return Err(ParseError::UnexpectedEnd),
                Some(c) if c == terminator => break,
                Some(c) if c.is_alphanumeric() || c == '_' => name.push(c),
                Some(_) => return Err(ParseError::BadGroupName { pos: start }),
            }
        }
        let valid_start = name.chars().next().is_some_and(|c| !c.is_ascii_digit());
        if !valid_start {
            return Err(ParseError::BadGroupName { pos: start });
        }
        Ok(name)
    }

    /// Parse a character class: `[abc]`, `[a-z]`, `[^abc]`.
    fn parse_char_class(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.advance(); // consume '['
        let negated = self.eat('^');

        let mut items = Vec::new();
        // Allow ']' as first character in class
        if self.eat(']') {
            items.push(ClassItem::Literal(']'));
        }

        while !self.eat(']') {
            let item_pos = self.pos;
            let item = self.parse_class_atom(start)?;
            // Check for range like a-z
            if self.peek() == Some('-') && !matches!(self.peek_at(1), Some(']') | None) {
                self.advance(); // consume '-'
                let end = self.parse_class_atom(start)?;
                match (item, end) {
                    (ClassItem::Literal(lo), ClassItem::Literal(hi)) if lo <= hi => {
                        items.push(ClassItem::Range(lo, hi));
                    }
                    (ClassItem::Literal(lo), ClassItem::Literal(hi)) => {
                        return Err(ParseError::BadRange {
                            lo,
                            hi,
                            pos: item_pos,
                        });
                    }
                    _ => return Err(ParseError::BadEscape { pos: item_pos }),
                }
            } else {
                items.push(item);
            }
        }
        Ok(Node::CharClass { negated, items })
    }

    fn parse_class_atom(&mut self, class_start: usize) -> Result<ClassItem, ParseError> {
        let start = self.pos;
        match self.advance() {
            None => Err(ParseError::UnterminatedClass { pos: class_start }),
            Some('\\') => match self.advance() {
                None => Err(ParseError::UnterminatedClass { pos: class_start }),
                // Backspace inside a class, not a word boundary.
                Some('b') => Ok(ClassItem::Literal('\x08')),
                Some(ch) => self.escape_item(ch, start),
            },
            Some(ch) => Ok(ClassItem::Literal(ch)),
        }
    }
}

fn repeat_count(n: u64, pos: usize) -> Result<u32, ParseError> {
    u32::try_from(n)
        .ok()
        .filter(|&n| n <= MAX_REPEAT_COUNT)
        .ok_or(ParseError::RepeatTooLarge { pos })
}

/// Parse `pattern` into its AST.
pub fn parse(pattern: &str) -> Result<Pattern, ParseError> {
    Parser::new(pattern).parse()
}
