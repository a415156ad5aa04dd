// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use bitflags::bitflags;

bitflags! {
    /// Matching options. Flags combine with `|` and can also be set
    /// from within the pattern, either globally with `(?ims)` or for a
    /// subexpression with `(?ims-x:...)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FlagSet: u8 {
        /// Letters match regardless of case. Inline letter `i`.
        const CASE_INSENSITIVE = 1 << 0;
        /// `^` and `$` also match at line breaks. Inline letter `m`.
        const MULTILINE = 1 << 1;
        /// `.` also matches `\n`. Inline letter `s`.
        const DOTALL = 1 << 2;
        /// Unescaped whitespace in the pattern is ignored and `#`
        /// starts a comment. Inline letter `x`.
        const VERBOSE = 1 << 3;
        /// Case folding stays within ASCII. Inline letter `a`.
        const ASCII_ONLY = 1 << 4;
    }
}

impl FlagSet {
    /// Maps an inline flag letter to its flag. `u` is accepted as a
    /// no-op for compatibility. Returns `None` for unknown letters.
    pub fn from_inline_letter(letter: char) -> Option<FlagSet> {
        match letter {
            'i' => Some(FlagSet::CASE_INSENSITIVE),
            'm' => Some(FlagSet::MULTILINE),
            's' => Some(FlagSet::DOTALL),
            'x' => Some(FlagSet::VERBOSE),
            'a' => Some(FlagSet::ASCII_ONLY),
            'u' => Some(FlagSet::empty()),
            _ => None,
        }
    }
}

/// Case comparison mode, resolved from the flags in force and baked
/// into each instruction at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fold {
    /// Exact comparison.
    Exact,
    /// ASCII letters fold, everything else compares exactly.
    Ascii,
    /// Simple one-to-one Unicode folding.
    Unicode,
}

impl Fold {
    pub fn from_flags(flags: FlagSet) -> Self {
        if !flags.contains(FlagSet::CASE_INSENSITIVE) {
            Fold::Exact
        } else if flags.contains(FlagSet::ASCII_ONLY) {
            Fold::Ascii
        } else {
            Fold::Unicode
        }
    }

    pub fn lower(self, c: char) -> char {
        match self {
            Fold::Exact => c,
            Fold::Ascii => c.to_ascii_lowercase(),
            Fold::Unicode => single_char_mapping(c.to_lowercase()).unwrap_or(c),
        }
    }

    pub fn upper(self, c: char) -> char {
        match self {
            Fold::Exact => c,
            Fold::Ascii => c.to_ascii_uppercase(),
            Fold::Unicode => single_char_mapping(c.to_uppercase()).unwrap_or(c),
        }
    }

    pub fn chars_eq(self, a: char, b: char) -> bool {
        a == b || self.lower(a) == self.lower(b)
    }
}

// Multi-char case mappings (such as the one for 'ß') are left alone;
// folding here is strictly one char to one char.
fn single_char_mapping(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    let first = mapped.next();
    if mapped.next().is_none() {
        first
    } else {
        None
    }
}
