// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The backtracking interpreter.
//!
//! One attempt runs the instruction vector over the text from a fixed
//! start position. Every `Split` pushes a frame recording where to
//! resume, and a failed instruction pops the youngest frame, restoring
//! position, captures and loop markers to what they were. A search is a
//! series of attempts, one per start position, left to right.

use crate::ast::{CharClass, LookaroundKind, PresetClass};
use crate::flags::Fold;
use crate::instruction::{CompiledProgram, Instruction};

/// Capture positions, two slots per group: the start and end byte
/// offsets, `None` until the group participates.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CaptureTable {
    slots: Vec<Option<usize>>,
}

impl CaptureTable {
    pub fn new(group_count: usize) -> Self {
        Self {
            slots: vec![None; group_count * 2],
        }
    }

    pub fn group_count(&self) -> usize {
        self.slots.len() / 2
    }

    /// Byte span of a group, `None` when it did not participate.
    pub fn span(&self, group: usize) -> Option<(usize, usize)> {
        match (self.slots[group * 2], self.slots[group * 2 + 1]) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    fn set_start(&mut self, group: usize, position: usize) {
        self.slots[group * 2] = Some(position);
        // a group re-entered by a loop starts over
        self.slots[group * 2 + 1] = None;
    }

    fn set_end(&mut self, group: usize, position: usize) {
        self.slots[group * 2 + 1] = Some(position);
    }
}

/// A suspended alternative: where to resume and the state to restore.
struct Frame {
    instruction_pointer: usize,
    position: usize,
    captures: CaptureTable,
    markers: Vec<usize>,
}

/// Counts backtracks across a whole search, lookaround sub-runs
/// included. `None` means unlimited.
struct StepBudget {
    remaining: Option<usize>,
    exhausted: bool,
}

impl StepBudget {
    fn new(limit: Option<usize>) -> Self {
        Self {
            remaining: limit,
            exhausted: false,
        }
    }

    fn consume(&mut self) -> bool {
        match self.remaining.as_mut() {
            Some(0) => {
                self.exhausted = true;
                false
            }
            Some(remaining) => {
                *remaining -= 1;
                true
            }
            None => true,
        }
    }
}

/// Finds the leftmost match at or after `start`. Start positions are
/// tried one char at a time, the end-of-text position included, so an
/// empty match right at the end is found.
pub fn search(
    program: &CompiledProgram,
    text: &str,
    start: usize,
    step_limit: Option<usize>,
) -> Option<CaptureTable> {
    let mut budget = StepBudget::new(step_limit);
    let mut at = start;

    loop {
        let captures = CaptureTable::new(program.group_count);
        if let Some((captures, _)) = run(
            &program.instructions,
            text,
            at,
            captures,
            program.marker_count,
            &mut budget,
        ) {
            return Some(captures);
        }
        if budget.exhausted {
            return None;
        }
        // an anchored program can only ever match at its first try
        if program.anchored_start {
            return None;
        }
        match char_at(text, at) {
            Some(c) => at += c.len_utf8(),
            None => return None,
        }
    }
}

/// One attempt anchored at `at`; no other start position is tried.
pub fn match_at(
    program: &CompiledProgram,
    text: &str,
    at: usize,
    step_limit: Option<usize>,
) -> Option<CaptureTable> {
    let mut budget = StepBudget::new(step_limit);
    let captures = CaptureTable::new(program.group_count);
    run(
        &program.instructions,
        text,
        at,
        captures,
        program.marker_count,
        &mut budget,
    )
    .map(|(captures, _)| captures)
}

fn run(
    instructions: &[Instruction],
    text: &str,
    start_position: usize,
    initial_captures: CaptureTable,
    marker_count: usize,
    budget: &mut StepBudget,
) -> Option<(CaptureTable, usize)> {
    let mut stack: Vec<Frame> = vec![];
    let mut captures = initial_captures;
    let mut markers = vec![usize::MAX; marker_count];
    let mut instruction_pointer = 0;
    let mut position = start_position;

    loop {
        let mut failed = false;

        match &instructions[instruction_pointer] {
            Instruction::Char { character, fold } => match char_at(text, position) {
                Some(c) if fold.chars_eq(c, *character) => {
                    position += c.len_utf8();
                    instruction_pointer += 1;
                }
                _ => failed = true,
            },
            Instruction::Str { value, fold } => {
                let mut current = position;
                let mut matched = true;
                for expected in value.chars() {
                    match char_at(text, current) {
                        Some(c) if fold.chars_eq(c, expected) => current += c.len_utf8(),
                        _ => {
                            matched = false;
                            break;
                        }
                    }
                }
                if matched {
                    position = current;
                    instruction_pointer += 1;
                } else {
                    failed = true;
                }
            }
            Instruction::Class { class, fold } => match char_at(text, position) {
                Some(c) if class_contains(class, c, *fold) => {
                    position += c.len_utf8();
                    instruction_pointer += 1;
                }
                _ => failed = true,
            },
            Instruction::Dot { dotall } => match char_at(text, position) {
                Some(c) if *dotall || c != '\n' => {
                    position += c.len_utf8();
                    instruction_pointer += 1;
                }
                _ => failed = true,
            },
            Instruction::LineStart { multiline } => {
                let holds =
                    position == 0 || (*multiline && text.as_bytes()[position - 1] == b'\n');
                if holds {
                    instruction_pointer += 1;
                } else {
                    failed = true;
                }
            }
            Instruction::LineEnd { multiline } => {
                let bytes = text.as_bytes();
                // the end of the text, or before a '\n': any one in
                // MULTILINE mode, otherwise only a final one
                let holds = position == bytes.len()
                    || (bytes[position] == b'\n'
                        && (*multiline || position + 1 == bytes.len()));
                if holds {
                    instruction_pointer += 1;
                } else {
                    failed = true;
                }
            }
            Instruction::TextStart => {
                if position == 0 {
                    instruction_pointer += 1;
                } else {
                    failed = true;
                }
            }
            Instruction::TextEnd => {
                if position == text.len() {
                    instruction_pointer += 1;
                } else {
                    failed = true;
                }
            }
            Instruction::WordBoundary { negated } => {
                let before = char_before(text, position)
                    .map_or(false, |c| PresetClass::Word.contains(c));
                let after =
                    char_at(text, position).map_or(false, |c| PresetClass::Word.contains(c));
                if (before != after) != *negated {
                    instruction_pointer += 1;
                } else {
                    failed = true;
                }
            }
            Instruction::SaveStart(group) => {
                captures.set_start(*group, position);
                instruction_pointer += 1;
            }
            Instruction::SaveEnd(group) => {
                captures.set_end(*group, position);
                instruction_pointer += 1;
            }
            Instruction::Backreference { group, fold } => match captures.span(*group) {
                Some((start, end)) => {
                    let mut current = position;
                    let mut matched = true;
                    for expected in text[start..end].chars() {
                        match char_at(text, current) {
                            Some(c) if fold.chars_eq(c, expected) => current += c.len_utf8(),
                            _ => {
                                matched = false;
                                break;
                            }
                        }
                    }
                    if matched {
                        position = current;
                        instruction_pointer += 1;
                    } else {
                        failed = true;
                    }
                }
                // a group that never matched can never be repeated
                None => failed = true,
            },
            Instruction::Split { primary, secondary } => {
                stack.push(Frame {
                    instruction_pointer: *secondary,
                    position,
                    captures: captures.clone(),
                    markers: markers.clone(),
                });
                instruction_pointer = *primary;
            }
            Instruction::Jump(target) => {
                instruction_pointer = *target;
            }
            Instruction::Mark { slot } => {
                markers[*slot] = position;
                instruction_pointer += 1;
            }
            Instruction::Progress { slot, exit } => {
                // an iteration that consumed nothing would loop forever,
                // so leave, keeping whatever it captured
                if markers[*slot] == position {
                    instruction_pointer = *exit;
                } else {
                    instruction_pointer += 1;
                }
            }
            Instruction::Conditional { group, else_target } => {
                if captures.span(*group).is_some() {
                    instruction_pointer += 1;
                } else {
                    instruction_pointer = *else_target;
                }
            }
            Instruction::Lookaround {
                kind,
                program,
                length,
            } => match kind {
                LookaroundKind::Ahead => {
                    match run(program, text, position, captures.clone(), marker_count, budget) {
                        Some((sub_captures, _)) => {
                            // captures made inside the lookahead survive
                            captures = sub_captures;
                            instruction_pointer += 1;
                        }
                        None => {
                            if budget.exhausted {
                                return None;
                            }
                            failed = true;
                        }
                    }
                }
                LookaroundKind::AheadNegative => {
                    match run(program, text, position, captures.clone(), marker_count, budget) {
                        Some(_) => failed = true,
                        None => {
                            if budget.exhausted {
                                return None;
                            }
                            instruction_pointer += 1;
                        }
                    }
                }
                LookaroundKind::Behind => match position_backward(text, position, *length) {
                    Some(start) => {
                        match run(program, text, start, captures.clone(), marker_count, budget) {
                            Some((sub_captures, end)) if end == position => {
                                captures = sub_captures;
                                instruction_pointer += 1;
                            }
                            Some(_) => failed = true,
                            None => {
                                if budget.exhausted {
                                    return None;
                                }
                                failed = true;
                            }
                        }
                    }
                    // not enough text behind
                    None => failed = true,
                },
                LookaroundKind::BehindNegative => match position_backward(text, position, *length)
                {
                    Some(start) => {
                        match run(program, text, start, captures.clone(), marker_count, budget) {
                            Some(_) => failed = true,
                            None => {
                                if budget.exhausted {
                                    return None;
                                }
                                instruction_pointer += 1;
                            }
                        }
                    }
                    // nothing behind to match, the assertion holds
                    None => instruction_pointer += 1,
                },
            },
            Instruction::Accept => {
                return Some((captures, position));
            }
        }

        if failed {
            match stack.pop() {
                Some(frame) => {
                    if !budget.consume() {
                        return None;
                    }
                    instruction_pointer = frame.instruction_pointer;
                    position = frame.position;
                    captures = frame.captures;
                    markers = frame.markers;
                }
                None => return None,
            }
        }
    }
}

fn char_at(text: &str, position: usize) -> Option<char> {
    text[position..].chars().next()
}

fn char_before(text: &str, position: usize) -> Option<char> {
    text[..position].chars().next_back()
}

/// Steps back `count` chars; `None` when the text is too short.
fn position_backward(text: &str, position: usize, count: usize) -> Option<usize> {
    let mut current = position;
    for _ in 0..count {
        let c = char_before(text, current)?;
        current -= c.len_utf8();
    }
    Some(current)
}

// Folded membership: the char itself or either of its case partners is
// in the set. Negation applies after folding, so `[^a]` under
// IGNORECASE rejects both 'a' and 'A'.
fn class_contains(class: &CharClass, c: char, fold: Fold) -> bool {
    let inside = class.contains_raw(c)
        || (fold != Fold::Exact
            && (class.contains_raw(fold.lower(c)) || class.contains_raw(fold.upper(c))));
    inside != class.negated
}
