// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::ast::{AstNode, GroupKind, GroupRef};
use crate::error::ParseError;
use crate::flags::{FlagSet, Fold};
use crate::instruction::{CompiledProgram, Instruction};
use crate::parser::{parse_from_str, ParsedPattern};

/// Parses and compiles in one go.
pub fn compile_from_str(pattern: &str, flags: FlagSet) -> Result<CompiledProgram, ParseError> {
    let parsed = parse_from_str(pattern, flags)?;
    Ok(compile(&parsed))
}

/// Lowers a parsed pattern to a flat instruction vector.
///
/// Compilation never fails: everything that can go wrong was already
/// rejected by the parser. Flags are resolved here once, per scope, and
/// baked into the instructions, so the matcher has no flag logic at all.
pub fn compile(parsed: &ParsedPattern) -> CompiledProgram {
    let mut compiler = Compiler::new(&parsed.group_names);

    // group 0 brackets the whole match
    let mut instructions = vec![Instruction::SaveStart(0)];
    compiler.emit(&parsed.ast, parsed.flags, &mut instructions);
    instructions.push(Instruction::SaveEnd(0));
    instructions.push(Instruction::Accept);

    let anchored_start = detect_anchored_start(&instructions);

    CompiledProgram {
        instructions,
        group_count: parsed.group_count,
        group_names: parsed.group_names.clone(),
        marker_count: compiler.next_marker,
        anchored_start,
    }
}

struct Compiler<'a> {
    group_names: &'a [(String, usize)],

    // progress slots are allocated from one counter so that the main
    // program and all lookaround sub-programs share a namespace
    next_marker: usize,
}

impl<'a> Compiler<'a> {
    fn new(group_names: &'a [(String, usize)]) -> Self {
        Self {
            group_names,
            next_marker: 0,
        }
    }

    fn allocate_marker(&mut self) -> usize {
        let slot = self.next_marker;
        self.next_marker += 1;
        slot
    }

    fn resolve_group(&self, reference: &GroupRef) -> usize {
        match reference {
            GroupRef::Index(index) => *index,
            // the parser checked the name exists
            GroupRef::Name(name) => self
                .group_names
                .iter()
                .find(|(defined, _)| defined == name)
                .map(|(_, index)| *index)
                .unwrap_or(0),
        }
    }

    fn emit(&mut self, node: &AstNode, flags: FlagSet, out: &mut Vec<Instruction>) {
        match node {
            AstNode::Char(character) => {
                out.push(Instruction::Char {
                    character: *character,
                    fold: Fold::from_flags(flags),
                });
            }
            AstNode::Str(value) => {
                out.push(Instruction::Str {
                    value: value.clone(),
                    fold: Fold::from_flags(flags),
                });
            }
            AstNode::Class(class) => {
                out.push(Instruction::Class {
                    class: class.clone(),
                    fold: Fold::from_flags(flags),
                });
            }
            AstNode::Dot => {
                out.push(Instruction::Dot {
                    dotall: flags.contains(FlagSet::DOTALL),
                });
            }
            AstNode::LineStart => {
                out.push(Instruction::LineStart {
                    multiline: flags.contains(FlagSet::MULTILINE),
                });
            }
            AstNode::LineEnd => {
                out.push(Instruction::LineEnd {
                    multiline: flags.contains(FlagSet::MULTILINE),
                });
            }
            AstNode::TextStart => out.push(Instruction::TextStart),
            AstNode::TextEnd => out.push(Instruction::TextEnd),
            AstNode::WordBoundary { negated } => {
                out.push(Instruction::WordBoundary { negated: *negated });
            }
            AstNode::Concat(items) => {
                for item in items {
                    self.emit(item, flags, out);
                }
            }
            AstNode::Alternation(branches) => self.emit_alternation(branches, flags, out),
            AstNode::Group { kind, body } => match kind {
                GroupKind::Capturing(index) | GroupKind::Named(_, index) => {
                    out.push(Instruction::SaveStart(*index));
                    self.emit(body, flags, out);
                    out.push(Instruction::SaveEnd(*index));
                }
                GroupKind::NonCapturing => self.emit(body, flags, out),
                GroupKind::FlagScope { set, clear } => {
                    let scoped = (flags | *set).difference(*clear);
                    self.emit(body, scoped, out);
                }
            },
            AstNode::Quantified {
                body,
                min,
                max,
                lazy,
            } => self.emit_quantified(body, *min, *max, *lazy, flags, out),
            AstNode::Backreference(reference) => {
                out.push(Instruction::Backreference {
                    group: self.resolve_group(reference),
                    fold: Fold::from_flags(flags),
                });
            }
            AstNode::Lookaround { kind, body, length } => {
                let mut program = vec![];
                self.emit(body, flags, &mut program);
                program.push(Instruction::Accept);
                out.push(Instruction::Lookaround {
                    kind: *kind,
                    program,
                    length: *length,
                });
            }
            AstNode::Conditional {
                reference,
                yes,
                no,
            } => {
                let group = self.resolve_group(reference);

                let conditional_position = out.len();
                out.push(Instruction::Conditional {
                    group,
                    else_target: 0, // patched below
                });
                self.emit(yes, flags, out);

                let jump_position = out.len();
                out.push(Instruction::Jump(0)); // patched below

                let no_start = out.len();
                self.emit(no, flags, out);
                let end = out.len();

                out[conditional_position] = Instruction::Conditional {
                    group,
                    else_target: no_start,
                };
                out[jump_position] = Instruction::Jump(end);
            }
            AstNode::Empty => {}
        }
    }

    // The branches chain head to tail:
    //
    //       split B1, L2
    //   B1: branch 1
    //       jump END
    //   L2: split B2, B3
    //   B2: branch 2
    //       jump END
    //   B3: branch 3
    //   END:
    //
    // The primary leg of each split is the branch itself, so earlier
    // branches win.
    fn emit_alternation(
        &mut self,
        branches: &[AstNode],
        flags: FlagSet,
        out: &mut Vec<Instruction>,
    ) {
        let mut jump_positions = vec![];

        for (index, branch) in branches.iter().enumerate() {
            if index + 1 < branches.len() {
                let split_position = out.len();
                out.push(Instruction::Jump(0)); // placeholder
                self.emit(branch, flags, out);

                jump_positions.push(out.len());
                out.push(Instruction::Jump(0)); // patched to END below

                out[split_position] = Instruction::Split {
                    primary: split_position + 1,
                    secondary: out.len(),
                };
            } else {
                self.emit(branch, flags, out);
            }
        }

        let end = out.len();
        for position in jump_positions {
            out[position] = Instruction::Jump(end);
        }
    }

    // Counted parts unroll; the unbounded tail becomes a loop guarded
    // against zero-width iterations:
    //
    //   LOOP: split BODY, END     (lazy: split END, BODY)
    //   BODY: mark k
    //         body
    //         progress k, exit END
    //         jump LOOP
    //   END:
    fn emit_quantified(
        &mut self,
        body: &AstNode,
        min: usize,
        max: Option<usize>,
        lazy: bool,
        flags: FlagSet,
        out: &mut Vec<Instruction>,
    ) {
        for _ in 0..min {
            self.emit(body, flags, out);
        }

        match max {
            Some(max) => {
                // a chain of optional copies; every exit leg lands
                // after the whole chain
                let mut split_positions = vec![];
                for _ in min..max {
                    split_positions.push(out.len());
                    out.push(Instruction::Jump(0)); // placeholder
                    self.emit(body, flags, out);
                }

                let end = out.len();
                for position in split_positions {
                    let body_entry = position + 1;
                    out[position] = if lazy {
                        Instruction::Split {
                            primary: end,
                            secondary: body_entry,
                        }
                    } else {
                        Instruction::Split {
                            primary: body_entry,
                            secondary: end,
                        }
                    };
                }
            }
            None => {
                let slot = self.allocate_marker();

                let loop_position = out.len();
                out.push(Instruction::Jump(0)); // placeholder
                out.push(Instruction::Mark { slot });
                self.emit(body, flags, out);

                let progress_position = out.len();
                out.push(Instruction::Progress { slot, exit: 0 });
                out.push(Instruction::Jump(loop_position));

                let end = out.len();
                out[loop_position] = if lazy {
                    Instruction::Split {
                        primary: end,
                        secondary: loop_position + 1,
                    }
                } else {
                    Instruction::Split {
                        primary: loop_position + 1,
                        secondary: end,
                    }
                };
                out[progress_position] = Instruction::Progress { slot, exit: end };
            }
        }
    }
}

// A program whose first effective instruction asserts the start of the
// text can only match at position 0, so searching never needs to try
// later start positions. Only the straight-line prefix is inspected.
fn detect_anchored_start(instructions: &[Instruction]) -> bool {
    for instruction in instructions {
        match instruction {
            Instruction::SaveStart(_) | Instruction::Mark { .. } => continue,
            Instruction::TextStart => return true,
            Instruction::LineStart { multiline } => return !multiline,
            _ => return false,
        }
    }
    false
}
