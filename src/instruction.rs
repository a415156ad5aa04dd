// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::{self, Write as _};

use crate::ast::{CharClass, ClassItem, LookaroundKind, PresetClass};
use crate::flags::Fold;

/// One step of a compiled program. Flags are baked in at compile time,
/// so the matcher never consults them; an instruction either consumes
/// text, asserts something about the current position, or steers the
/// instruction pointer.
#[derive(Debug, PartialEq, Clone)]
pub enum Instruction {
    Char {
        character: char,
        fold: Fold,
    },
    Str {
        value: String,
        fold: Fold,
    },
    Class {
        class: CharClass,
        fold: Fold,
    },
    Dot {
        dotall: bool,
    },
    LineStart {
        multiline: bool,
    },
    LineEnd {
        multiline: bool,
    },
    TextStart,
    TextEnd,
    WordBoundary {
        negated: bool,
    },
    SaveStart(usize),
    SaveEnd(usize),
    Backreference {
        group: usize,
        fold: Fold,
    },
    /// Try `primary` first; on failure resume at `secondary`.
    Split {
        primary: usize,
        secondary: usize,
    },
    Jump(usize),
    /// Remember the current position in `slot`, at the top of a loop
    /// iteration.
    Mark {
        slot: usize,
    },
    /// At the bottom of a loop: if the position has not moved since the
    /// matching `Mark`, leave the loop by jumping to `exit`.
    Progress {
        slot: usize,
        exit: usize,
    },
    /// `(?(n)...)`: fall through when group `n` participated, jump to
    /// `else_target` when it did not.
    Conditional {
        group: usize,
        else_target: usize,
    },
    /// A zero-width sub-match. `length` is the fixed char width the
    /// behind kinds step back by; it is zero for the ahead kinds.
    Lookaround {
        kind: LookaroundKind,
        program: Vec<Instruction>,
        length: usize,
    },
    Accept,
}

/// The compiled form of a pattern: a flat instruction vector plus the
/// bookkeeping the matcher and the capture API need. Immutable once
/// built, so one program can serve any number of concurrent searches.
#[derive(Debug, PartialEq, Clone)]
pub struct CompiledProgram {
    pub instructions: Vec<Instruction>,
    /// capture groups, the implicit whole-match group 0 included
    pub group_count: usize,
    pub group_names: Vec<(String, usize)>,
    /// progress slots used by unbounded loops, sub-programs included
    pub marker_count: usize,
    /// true when the program can only ever match at position 0, which
    /// lets a search skip the start-position scan
    pub anchored_start: bool,
}

impl CompiledProgram {
    /// A numbered listing of the program, nested lookaround bodies
    /// indented. Meant for tests and debugging.
    pub fn get_debug_text(&self) -> String {
        let mut buffer = String::new();
        write_instruction_list(&mut buffer, &self.instructions, 0);
        buffer
    }
}

impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_debug_text())
    }
}

fn write_instruction_list(buffer: &mut String, instructions: &[Instruction], depth: usize) {
    let indent = "  ".repeat(depth);
    for (index, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::Lookaround {
                kind,
                program,
                length,
            } => {
                let name = match kind {
                    LookaroundKind::Ahead => "lookahead".to_string(),
                    LookaroundKind::AheadNegative => "lookahead_negative".to_string(),
                    LookaroundKind::Behind => format!("lookbehind {}", length),
                    LookaroundKind::BehindNegative => format!("lookbehind_negative {}", length),
                };
                let _ = writeln!(buffer, "{}{} {} {{", indent, index, name);
                write_instruction_list(buffer, program, depth + 1);
                let _ = writeln!(buffer, "{}}}", indent);
            }
            _ => {
                let _ = writeln!(buffer, "{}{} {}", indent, index, instruction);
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Char { character, fold } => {
                write!(f, "char {:?}{}", character, fold_suffix(*fold))
            }
            Instruction::Str { value, fold } => {
                write!(f, "string {:?}{}", value, fold_suffix(*fold))
            }
            Instruction::Class { class, fold } => {
                write!(f, "class {}{}", class_text(class), fold_suffix(*fold))
            }
            Instruction::Dot { dotall } => {
                if *dotall {
                    write!(f, "any (dotall)")
                } else {
                    write!(f, "any")
                }
            }
            Instruction::LineStart { multiline } => {
                if *multiline {
                    write!(f, "line_start (multiline)")
                } else {
                    write!(f, "line_start")
                }
            }
            Instruction::LineEnd { multiline } => {
                if *multiline {
                    write!(f, "line_end (multiline)")
                } else {
                    write!(f, "line_end")
                }
            }
            Instruction::TextStart => write!(f, "text_start"),
            Instruction::TextEnd => write!(f, "text_end"),
            Instruction::WordBoundary { negated } => {
                if *negated {
                    write!(f, "not_word_boundary")
                } else {
                    write!(f, "word_boundary")
                }
            }
            Instruction::SaveStart(group) => write!(f, "save_start {}", group),
            Instruction::SaveEnd(group) => write!(f, "save_end {}", group),
            Instruction::Backreference { group, fold } => {
                write!(f, "backref {}{}", group, fold_suffix(*fold))
            }
            Instruction::Split { primary, secondary } => {
                write!(f, "split {}, {}", primary, secondary)
            }
            Instruction::Jump(target) => write!(f, "jump {}", target),
            Instruction::Mark { slot } => write!(f, "mark {}", slot),
            Instruction::Progress { slot, exit } => write!(f, "progress {}, exit {}", slot, exit),
            Instruction::Conditional { group, else_target } => {
                write!(f, "conditional {}, else {}", group, else_target)
            }
            Instruction::Lookaround { kind, program, .. } => {
                let name = match kind {
                    LookaroundKind::Ahead => "lookahead",
                    LookaroundKind::AheadNegative => "lookahead_negative",
                    LookaroundKind::Behind => "lookbehind",
                    LookaroundKind::BehindNegative => "lookbehind_negative",
                };
                write!(f, "{} ({} instructions)", name, program.len())
            }
            Instruction::Accept => write!(f, "accept"),
        }
    }
}

fn fold_suffix(fold: Fold) -> &'static str {
    match fold {
        Fold::Exact => "",
        Fold::Ascii => " (ignorecase ascii)",
        Fold::Unicode => " (ignorecase)",
    }
}

fn class_text(class: &CharClass) -> String {
    let mut s = String::from("[");
    if class.negated {
        s.push('^');
    }
    for item in &class.items {
        match item {
            ClassItem::Char(c) => {
                for escaped in c.escape_debug() {
                    s.push(escaped);
                }
            }
            ClassItem::Range(start, end) => {
                let _ = write!(s, "{}-{}", start, end);
            }
            ClassItem::Preset(preset) => s.push_str(match preset {
                PresetClass::Word => "\\w",
                PresetClass::Digit => "\\d",
                PresetClass::Space => "\\s",
            }),
            ClassItem::PresetNegated(preset) => s.push_str(match preset {
                PresetClass::Word => "\\W",
                PresetClass::Digit => "\\D",
                PresetClass::Space => "\\S",
            }),
        }
    }
    s.push(']');
    s
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_str_eq;

    use crate::ast::{CharClass, ClassItem, PresetClass};
    use crate::flags::Fold;

    use super::{CompiledProgram, Instruction};

    #[test]
    fn test_program_debug_text() {
        let program = CompiledProgram {
            instructions: vec![
                Instruction::SaveStart(0),
                Instruction::Char {
                    character: 'a',
                    fold: Fold::Exact,
                },
                Instruction::Split {
                    primary: 1,
                    secondary: 4,
                },
                Instruction::Jump(2),
                Instruction::Class {
                    class: CharClass::new(
                        true,
                        vec![
                            ClassItem::Range('0', '9'),
                            ClassItem::Preset(PresetClass::Space),
                        ],
                    ),
                    fold: Fold::Exact,
                },
                Instruction::SaveEnd(0),
                Instruction::Accept,
            ],
            group_count: 1,
            group_names: vec![],
            marker_count: 0,
            anchored_start: false,
        };

        assert_str_eq!(
            program.get_debug_text(),
            "\
0 save_start 0
1 char 'a'
2 split 1, 4
3 jump 2
4 class [^0-9\\s]
5 save_end 0
6 accept
"
        );
    }
}
