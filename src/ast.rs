// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::flags::FlagSet;

#[derive(Debug, PartialEq, Clone)]
pub enum AstNode {
    /// A single literal character.
    Char(char),
    /// A run of literal characters, produced by merging adjacent
    /// unquantified chars.
    Str(String),
    Class(CharClass),
    Dot,
    /// `^`
    LineStart,
    /// `$`
    LineEnd,
    /// `\A`
    TextStart,
    /// `\Z`
    TextEnd,
    /// `\b` / `\B`
    WordBoundary { negated: bool },
    Concat(Vec<AstNode>),
    Alternation(Vec<AstNode>),
    Group {
        kind: GroupKind,
        body: Box<AstNode>,
    },
    /// `max` of `None` means unbounded.
    Quantified {
        body: Box<AstNode>,
        min: usize,
        max: Option<usize>,
        lazy: bool,
    },
    Backreference(GroupRef),
    /// `length` is the fixed char width of the body, inferred by the
    /// parser. It is only meaningful for the behind kinds.
    Lookaround {
        kind: LookaroundKind,
        body: Box<AstNode>,
        length: usize,
    },
    /// `(?(ref)yes|no)`; a missing no-branch parses as `Empty`.
    Conditional {
        reference: GroupRef,
        yes: Box<AstNode>,
        no: Box<AstNode>,
    },
    /// Zero-width nothing: an empty branch or an empty group body.
    Empty,
}

#[derive(Debug, PartialEq, Clone)]
pub enum GroupKind {
    /// `(...)`, holding the group index.
    Capturing(usize),
    /// `(?P<name>...)` / `(?<name>...)`; named groups also get an index.
    Named(String, usize),
    /// `(?:...)`
    NonCapturing,
    /// `(?i-m:...)`
    FlagScope { set: FlagSet, clear: FlagSet },
}

/// How a backreference or conditional names its group.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LookaroundKind {
    Ahead,          // (?=
    AheadNegative,  // (?!
    Behind,         // (?<=
    BehindNegative, // (?<!
}

/// A bracketed character class, or a bare preset class such as `\d`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CharClass {
    pub negated: bool,
    pub items: Vec<ClassItem>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Preset(PresetClass),
    /// `[\W]` and friends: everything outside the preset.
    PresetNegated(PresetClass),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PresetClass {
    Word,
    Digit,
    Space,
}

impl PresetClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            PresetClass::Word => c.is_ascii_alphanumeric() || c == '_',
            PresetClass::Digit => c.is_ascii_digit(),
            PresetClass::Space => matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'),
        }
    }
}

impl CharClass {
    pub fn new(negated: bool, items: Vec<ClassItem>) -> Self {
        Self { negated, items }
    }

    /// A class holding a single preset, for `\d` and friends outside
    /// brackets.
    pub fn from_preset(preset: PresetClass, negated: bool) -> Self {
        Self::new(negated, vec![ClassItem::Preset(preset)])
    }

    /// Membership before the leading `^` is applied. Case folding is
    /// the matcher's business, not the class's.
    pub fn contains_raw(&self, c: char) -> bool {
        self.items.iter().any(|item| match item {
            ClassItem::Char(member) => *member == c,
            ClassItem::Range(start, end) => (*start..=*end).contains(&c),
            ClassItem::Preset(preset) => preset.contains(c),
            ClassItem::PresetNegated(preset) => !preset.contains(c),
        })
    }
}
