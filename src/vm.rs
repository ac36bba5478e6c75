//! VM executor: runs compiled bytecode against an input string.
//! Backtracking on an explicit stack, so backreferences work and long inputs
//! never grow the call stack.
//!
//! Performance notes:
//! - Undo log instead of full captures.clone() on Split (save/restore only changed slots)
//! - Slot writes are only logged while some alternative could restore them

use crate::ast::{AtKind, class_matches};
use crate::category::is_word_char;
use crate::compiler::{Inst, Program};

/// Result of a full match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Captured groups: (start, end) char offsets. Slot `2*i` is start,
    /// `2*i+1` is end for group `i`; group 0 is the whole input.
    pub captures: Vec<Option<usize>>,
}

impl MatchResult {
    /// Char span of group `index`, if it participated in the match.
    pub fn group(&self, index: usize) -> Option<(usize, usize)> {
        let start = self.captures.get(index * 2).copied().flatten()?;
        let end = self.captures.get(index * 2 + 1).copied().flatten()?;
        Some((start, end))
    }
}

/// An entry in the undo log: (slot_index, old_value).
type UndoEntry = (usize, Option<usize>);

/// A pending alternative: where to resume and how much of the undo log to
/// roll back first.
#[derive(Debug, Clone, Copy)]
struct Backtrack {
    pc: usize,
    pos: usize,
    undo_mark: usize,
}

enum Step {
    Next { pc: usize, pos: usize },
    Fail,
    Match,
}

/// Match the whole input, anchored at both ends.
pub fn full_match(program: &Program, input: &str) -> Option<MatchResult> {
    let chars: Vec<char> = input.chars().collect();
    let mut vm = Vm {
        program,
        chars: &chars,
        slots: vec![None; program.n_slots],
        undo_log: Vec::new(),
        stack: Vec::new(),
    };
    vm.slots[0] = Some(0);
    if !vm.run() {
        return None;
    }
    let mut captures = vm.slots;
    captures.truncate((program.n_groups + 1) * 2);
    Some(MatchResult { captures })
}

struct Vm<'a> {
    program: &'a Program,
    chars: &'a [char],
    /// Capture slots followed by repeat counters and iteration marks.
    slots: Vec<Option<usize>>,
    undo_log: Vec<UndoEntry>,
    stack: Vec<Backtrack>,
}

impl Vm<'_> {
    /// Returns true if a match reaching the end of input is found.
    fn run(&mut self) -> bool {
        let (mut pc, mut pos) = (0, 0);
        loop {
            match self.step(pc, pos) {
                Step::Next { pc: next_pc, pos: next_pos } => {
                    pc = next_pc;
                    pos = next_pos;
                }
                Step::Match => return true,
                Step::Fail => match self.backtrack() {
                    Some(resume) => {
                        pc = resume.pc;
                        pos = resume.pos;
                    }
                    None => return false,
                },
            }
        }
    }

    fn step(&mut self, pc: usize, pos: usize) -> Step {
        let (program, chars) = (self.program, self.chars);
        let Some(inst) = program.insts.get(pc) else {
            return Step::Fail;
        };
        let consume = |ok: bool| {
            if ok {
                Step::Next {
                    pc: pc + 1,
                    pos: pos + 1,
                }
            } else {
                Step::Fail
            }
        };
        match inst {
            Inst::Match => {
                if pos != chars.len() {
                    return Step::Fail;
                }
                self.slots[1] = Some(pos);
                Step::Match
            }
            Inst::Char(expected) => consume(chars.get(pos) == Some(expected)),
            Inst::AnyChar => consume(chars.get(pos).is_some_and(|&ch| ch != '\n')),
            Inst::Class { items, negated } => consume(
                chars
                    .get(pos)
                    .is_some_and(|&ch| class_matches(ch, items, *negated)),
            ),
            Inst::Category(cat) => consume(chars.get(pos).is_some_and(|&ch| cat.matches(ch))),
            Inst::Jump(target) => Step::Next { pc: *target, pos },
            Inst::Split(first, second) => {
                self.push_alternative(*second, pos);
                Step::Next { pc: *first, pos }
            }
            Inst::Save(slot) => {
                self.set_slot(*slot, Some(pos));
                Step::Next { pc: pc + 1, pos }
            }
            Inst::ResetCounter(counter) => {
                self.set_slot(*counter, Some(0));
                Step::Next { pc: pc + 1, pos }
            }
            Inst::RepeatHead {
                counter,
                min,
                max,
                greedy,
                exit,
            } => {
                let count = self.count(*counter);
                let body = pc + 1;
                if count < u64::from(*min) {
                    Step::Next { pc: body, pos }
                } else if count >= u64::from(*max) {
                    Step::Next { pc: *exit, pos }
                } else if *greedy {
                    self.push_alternative(*exit, pos);
                    Step::Next { pc: body, pos }
                } else {
                    self.push_alternative(body, pos);
                    Step::Next { pc: *exit, pos }
                }
            }
            Inst::RepeatTail {
                counter,
                mark,
                min,
                head,
            } => {
                let count = self.count(*counter);
                // An empty optional iteration would loop forever.
                if count >= u64::from(*min) && self.slots[*mark] == Some(pos) {
                    return Step::Fail;
                }
                self.set_slot(*counter, Some(count as usize + 1));
                Step::Next { pc: *head, pos }
            }
            Inst::Assert(kind) => {
                if assertion_holds(*kind, chars, pos) {
                    Step::Next { pc: pc + 1, pos }
                } else {
                    Step::Fail
                }
            }
            Inst::Backref(group_idx) => {
                let start_slot = group_idx * 2;
                let end_slot = group_idx * 2 + 1;
                let span = self
                    .slots
                    .get(start_slot)
                    .copied()
                    .flatten()
                    .zip(self.slots.get(end_slot).copied().flatten());
                match span {
                    Some((gs, ge)) if gs <= ge => {
                        let group_len = ge - gs;
                        if pos + group_len <= chars.len()
                            && chars[gs..ge] == chars[pos..pos + group_len]
                        {
                            Step::Next {
                                pc: pc + 1,
                                pos: pos + group_len,
                            }
                        } else {
                            Step::Fail
                        }
                    }
                    _ => Step::Fail,
                }
            }
            Inst::Nop => Step::Next { pc: pc + 1, pos },
        }
    }

    fn count(&self, counter: usize) -> u64 {
        self.slots[counter].unwrap_or(0) as u64
    }

    fn set_slot(&mut self, slot: usize, value: Option<usize>) {
        if !self.stack.is_empty() {
            self.undo_log.push((slot, self.slots[slot]));
        }
        self.slots[slot] = value;
    }

    fn push_alternative(&mut self, pc: usize, pos: usize) {
        self.stack.push(Backtrack {
            pc,
            pos,
            undo_mark: self.undo_log.len(),
        });
    }

    /// Pop the newest alternative and restore the slots it saw.
    fn backtrack(&mut self) -> Option<Backtrack> {
        let resume = self.stack.pop()?;
        for (slot, old_val) in self.undo_log.drain(resume.undo_mark..).rev() {
            self.slots[slot] = old_val;
        }
        Some(resume)
    }
}

fn assertion_holds(kind: AtKind, chars: &[char], pos: usize) -> bool {
    match kind {
        AtKind::Start | AtKind::StartText => pos == 0,
        // `$` also holds right before a trailing newline.
        AtKind::End => {
            pos == chars.len() || (pos + 1 == chars.len() && chars[pos] == '\n')
        }
        AtKind::EndText => pos == chars.len(),
        AtKind::WordBoundary => is_word_boundary(chars, pos),
        AtKind::NonWordBoundary => !is_word_boundary(chars, pos),
    }
}

/// Check if `pos` is at a word boundary.
fn is_word_boundary(chars: &[char], pos: usize) -> bool {
    let before = pos > 0 && is_word_char(chars[pos - 1]);
    let after = chars.get(pos).is_some_and(|&ch| is_word_char(ch));
    before != after
}
