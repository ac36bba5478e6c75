//! Compiler: lowers a pattern AST into instructions for the verifying VM.

use crate::ast::*;
use crate::category::Category;

/// VM instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// Match a specific character.
    Char(char),
    /// Match any character except newline.
    AnyChar,
    /// Match a character class.
    Class { items: Vec<ClassItem>, negated: bool },
    /// Match a shorthand category (\d, \w, \s, etc.)
    Category(Category),
    /// Successful match; only accepted at the end of the input.
    Match,
    /// Jump to target instruction.
    Jump(usize),
    /// Try first path, fallback to second.
    Split(usize, usize),
    /// Save position into slot.
    Save(usize),
    /// Set a repeat counter slot to zero.
    ResetCounter(usize),
    /// Loop head of a counted repeat. Enters the body (next instruction)
    /// while the counter is below `min`, leaves for `exit` once it reaches
    /// `max`, and otherwise branches both ways in `greedy` order.
    RepeatHead {
        counter: usize,
        min: u32,
        max: u32,
        greedy: bool,
        exit: usize,
    },
    /// Loop tail of a counted repeat: bump the counter and jump to `head`.
    /// An optional iteration that consumed nothing since `mark` fails instead.
    RepeatTail {
        counter: usize,
        mark: usize,
        min: u32,
        head: usize,
    },
    /// Zero-width assertion.
    Assert(AtKind),
    /// Match the same text as capture group N.
    Backref(usize),
    /// No-op (used as placeholder).
    Nop,
}

/// Compiled program.
#[derive(Debug, Clone)]
pub struct Program {
    pub insts: Vec<Inst>,
    pub n_groups: usize,
    /// Capture slots for groups `0..=n_groups`, then the repeat registers.
    pub n_slots: usize,
}

/// Compile a parsed pattern into a program.
pub fn compile(pattern: &Pattern) -> Program {
    let mut compiler = Compiler {
        insts: Vec::new(),
        n_slots: (pattern.group_count + 1) * 2,
    };
    compiler.emit_sequence(&pattern.sequence);
    compiler.insts.push(Inst::Match);
    Program {
        insts: compiler.insts,
        n_groups: pattern.group_count,
        n_slots: compiler.n_slots,
    }
}

struct Compiler {
    insts: Vec<Inst>,
    n_slots: usize,
}

impl Compiler {
    fn alloc_slot(&mut self) -> usize {
        self.n_slots += 1;
        self.n_slots - 1
    }

    fn emit_sequence(&mut self, seq: &[Node]) {
        for node in seq {
            self.emit(node);
        }
    }

    fn emit(&mut self, node: &Node) {
        match node {
            Node::Literal(ch) => {
                self.insts.push(Inst::Char(*ch));
            }
            Node::Any => {
                self.insts.push(Inst::AnyChar);
            }
            Node::At(kind) => {
                self.insts.push(Inst::Assert(*kind));
            }
            Node::CharClass { negated, items } => {
                self.insts.push(Inst::Class {
                    items: items.clone(),
                    negated: *negated,
                });
            }
            Node::Range(lo, hi) => {
                self.insts.push(Inst::Class {
                    items: vec![ClassItem::Range(*lo, *hi)],
                    negated: false,
                });
            }
            Node::Category(cat) => {
                self.insts.push(Inst::Category(*cat));
            }
            Node::Branch(arms) => self.emit_branch(arms),
            Node::Repeat {
                min,
                max,
                greedy,
                body,
            } => self.emit_repeat(*min, *max, *greedy, body),
            Node::Subpattern { index, body } => match index {
                Some(index) => {
                    self.insts.push(Inst::Save(*index * 2));
                    self.emit_sequence(body);
                    self.insts.push(Inst::Save(*index * 2 + 1));
                }
                None => self.emit_sequence(body),
            },
            Node::GroupRef(index) => {
                self.insts.push(Inst::Backref(*index));
            }
        }
    }

    fn emit_branch(&mut self, arms: &[Sequence]) {
        // a|b|c compiles to:
        //   split L1, L2
        //   L1: <a> jump END
        //   L2: split L3, L4
        //   L3: <b> jump END
        //   L4: <c>
        //   END:
        let Some((last, rest)) = arms.split_last() else {
            return;
        };
        let mut fixup_jumps = Vec::new();
        for arm in rest {
            let split_pc = self.insts.len();
            self.insts.push(Inst::Nop); // placeholder for split
            let arm_start = self.insts.len();
            self.emit_sequence(arm);
            fixup_jumps.push(self.insts.len());
            self.insts.push(Inst::Nop); // placeholder for jump to end
            let next_arm = self.insts.len();
            self.insts[split_pc] = Inst::Split(arm_start, next_arm);
        }
        self.emit_sequence(last);
        let end = self.insts.len();
        for jpc in fixup_jumps {
            self.insts[jpc] = Inst::Jump(end);
        }
    }

    fn emit_repeat(&mut self, min: u32, max: u32, greedy: bool, body: &[Node]) {
        match (min, max) {
            (1, 1) => self.emit_sequence(body),
            (0, 1) => self.emit_optional(body, greedy),
            _ => self.emit_counted(min, max, greedy, body),
        }
    }

    fn emit_counted(&mut self, min: u32, max: u32, greedy: bool, body: &[Node]) {
        //     reset C
        // L1: head C, min, max -> L2
        //     save M
        //     <body>
        //     tail C, M -> L1
        // L2:
        let counter = self.alloc_slot();
        let mark = self.alloc_slot();
        self.insts.push(Inst::ResetCounter(counter));
        let head = self.insts.len();
        self.insts.push(Inst::Nop); // placeholder for head
        self.insts.push(Inst::Save(mark));
        self.emit_sequence(body);
        self.insts.push(Inst::RepeatTail {
            counter,
            mark,
            min,
            head,
        });
        self.insts[head] = Inst::RepeatHead {
            counter,
            min,
            max,
            greedy,
            exit: self.insts.len(),
        };
    }

    fn emit_optional(&mut self, body: &[Node], greedy: bool) {
        // split L1, L2 (greedy: prefer L1)
        // L1: <body>
        // L2:
        let split_pc = self.insts.len();
        self.insts.push(Inst::Nop);
        let l1 = self.insts.len();
        self.emit_sequence(body);
        let l2 = self.insts.len();
        self.insts[split_pc] = if greedy {
            Inst::Split(l1, l2)
        } else {
            Inst::Split(l2, l1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn insts(pattern: &str) -> Vec<Inst> {
        compile(&parse(pattern).expect("pattern parses")).insts
    }

    #[test]
    fn literal_sequence() {
        assert_eq!(
            insts("ab"),
            vec![Inst::Char('a'), Inst::Char('b'), Inst::Match]
        );
    }

    #[test]
    fn alternation_layout() {
        assert_eq!(
            insts("a|b"),
            vec![
                Inst::Split(1, 3),
                Inst::Char('a'),
                Inst::Jump(4),
                Inst::Char('b'),
                Inst::Match,
            ]
        );
    }

    #[test]
    fn star_is_a_counted_loop() {
        let program = compile(&parse("x*").expect("parses"));
        assert_eq!(program.n_slots, 4);
        assert_eq!(
            program.insts,
            vec![
                Inst::ResetCounter(2),
                Inst::RepeatHead {
                    counter: 2,
                    min: 0,
                    max: MAX_REPEAT,
                    greedy: true,
                    exit: 5,
                },
                Inst::Save(3),
                Inst::Char('x'),
                Inst::RepeatTail {
                    counter: 2,
                    mark: 3,
                    min: 0,
                    head: 1,
                },
                Inst::Match,
            ]
        );
    }

    #[test]
    fn program_size_does_not_grow_with_counts() {
        assert_eq!(insts("x{65535}").len(), insts("x{2}").len());
        assert_eq!(
            insts("x{2,5}?")[1],
            Inst::RepeatHead {
                counter: 2,
                min: 2,
                max: 5,
                greedy: false,
                exit: 5,
            }
        );
    }

    #[test]
    fn optional_and_single_repeats() {
        assert_eq!(
            insts("x?"),
            vec![Inst::Split(1, 2), Inst::Char('x'), Inst::Match]
        );
        assert_eq!(
            insts("x??"),
            vec![Inst::Split(2, 1), Inst::Char('x'), Inst::Match]
        );
        assert_eq!(insts("x{1}"), vec![Inst::Char('x'), Inst::Match]);
    }

    #[test]
    fn nested_repeats_get_their_own_registers() {
        let program = compile(&parse("(a*)*").expect("parses"));
        assert_eq!(program.n_groups, 1);
        assert_eq!(program.n_slots, 4 + 4);
    }

    #[test]
    fn capture_saves_slots() {
        let program = compile(&parse("(a)\\1").expect("parses"));
        assert_eq!(program.n_groups, 1);
        assert_eq!(program.n_slots, 4);
        assert_eq!(
            program.insts,
            vec![
                Inst::Save(2),
                Inst::Char('a'),
                Inst::Save(3),
                Inst::Backref(1),
                Inst::Match,
            ]
        );
    }
}
