// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::flags::FlagSet;
use crate::location::Location;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // A literal character, including the result of an identity escape.
    Char(char),

    // A character class is lexed as a run of tokens:
    // start, members (Char/CharRange/PresetCharSet), end.
    ClassStart,
    ClassStartNegated,
    ClassEnd,
    CharRange(char, char),

    // The letter of `\w`, `\W`, `\d`, `\D`, `\s` or `\S`.
    PresetCharSet(char),
    // The letter of `\b` or `\B` (outside a class).
    BoundaryAssertion(char),

    StartAssertion,       // ^
    EndAssertion,         // $
    StringStartAssertion, // \A
    StringEndAssertion,   // \Z

    Dot,
    LogicOr, // |

    // Quantifiers. The flag is the lazy marker (`?` suffix).
    Optional(bool),    // ? / ??
    OneOrMore(bool),   // + / +?
    ZeroOrMore(bool),  // * / *?
    Repetition(Repetition, bool),

    GroupStart,                // (
    NonCapturing,              // (?:
    NamedCapture(String),      // (?P<name> or (?<name>
    LookAhead,                 // (?=
    LookAheadNegative,         // (?!
    LookBehind,                // (?<=
    LookBehindNegative,        // (?<!
    ConditionalIndex(usize),   // (?(1)
    ConditionalName(String),   // (?(name)
    // (?i-m: sets and clears flags for the enclosed subexpression
    FlagGroupStart { set: FlagSet, clear: FlagSet },
    GroupEnd,                  // )

    BackReferenceNumber(usize),      // \1 .. \99
    BackReferenceIdentifier(String), // \k<name> or (?P=name)
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Repetition {
    Specified(usize),    // {m}
    AtLeast(usize),      // {m,}
    AtMost(usize),       // {,n}
    Range(usize, usize), // {m,n}
}

#[derive(Debug, PartialEq, Clone)]
pub struct TokenWithRange {
    pub token: Token,
    pub range: Location,
}

impl TokenWithRange {
    pub fn new(token: Token, range: Location) -> Self {
        Self { token, range }
    }

    pub fn from_position_and_length(token: Token, position: &Location, length: usize) -> Self {
        Self {
            token,
            range: position.with_length(length),
        }
    }
}
