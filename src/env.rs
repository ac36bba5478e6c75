//! Capture-group bindings made during one generation attempt.
//!
//! `Bindings` is a persistent cons list: `bind` returns a new head sharing the
//! old tail, so a snapshot taken before an alternative is unaffected by what
//! the alternative binds.

use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    head: Option<Rc<Cell>>,
}

#[derive(Debug)]
struct Cell {
    index: usize,
    text: Rc<str>,
    next: Bindings,
}

impl Bindings {
    /// Empty environment, used at the start of every attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend with `index -> text`. `self` is left untouched.
    pub fn bind(&self, index: usize, text: &str) -> Bindings {
        Bindings {
            head: Some(Rc::new(Cell {
                index,
                text: Rc::from(text),
                next: self.clone(),
            })),
        }
    }

    /// Most recent binding for `index`, if any.
    pub fn lookup(&self, index: usize) -> Option<&str> {
        self.iter()
            .find(|&(i, _)| i == index)
            .map(|(_, text)| text)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Bindings from newest to oldest; shadowed entries included.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            cur: self.head.as_deref(),
        }
    }
}

pub struct Iter<'a> {
    cur: Option<&'a Cell>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.cur?;
        self.cur = cell.next.head.as_deref();
        Some((cell.index, &*cell.text))
    }
}
