//! Character-class tables over the byte-range alphabet U+0000..=U+00FF.
//!
//! Tables are built once on first use and shared read-only afterwards.

use std::sync::LazyLock;

/// Size of the generation alphabet.
pub const ALPHABET_SIZE: u32 = 256;

/// Shorthand character category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `\s`
    Space,
    /// `\S`
    NotSpace,
    /// `\d`
    Digit,
    /// `\D`
    NotDigit,
    /// `\w`
    Word,
    /// `\W`
    NotWord,
    LineBreak,
    NotLineBreak,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Space,
        Category::NotSpace,
        Category::Digit,
        Category::NotDigit,
        Category::Word,
        Category::NotWord,
        Category::LineBreak,
        Category::NotLineBreak,
    ];

    /// Check if a character belongs to this category.
    pub fn matches(self, ch: char) -> bool {
        match self {
            Category::Space => is_space(ch),
            Category::NotSpace => !is_space(ch),
            Category::Digit => ch.is_ascii_digit(),
            Category::NotDigit => !ch.is_ascii_digit(),
            Category::Word => is_word_char(ch),
            Category::NotWord => !is_word_char(ch),
            Category::LineBreak => is_line_break(ch),
            Category::NotLineBreak => !is_line_break(ch),
        }
    }

    /// Every alphabet character in this category, in code point order.
    pub fn chars(self) -> &'static [char] {
        &TABLES[self as usize]
    }
}

static TABLES: LazyLock<Vec<Vec<char>>> = LazyLock::new(|| {
    Category::ALL
        .iter()
        .map(|cat| alphabet().filter(|&ch| cat.matches(ch)).collect())
        .collect()
});

static ANY: LazyLock<Vec<char>> = LazyLock::new(|| alphabet().filter(|&ch| ch != '\n').collect());

/// Characters `.` may produce.
pub fn any_chars() -> &'static [char] {
    &ANY
}

/// Iterate the whole alphabet in code point order.
pub fn alphabet() -> impl Iterator<Item = char> {
    (0..ALPHABET_SIZE).filter_map(char::from_u32)
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}
