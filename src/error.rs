// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use thiserror::Error;

use crate::location::Location;

/// Errors raised while turning a pattern string into a compiled program.
///
/// All of these are detected at compile time. A pattern that compiles
/// never produces an error while matching, only "no match".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quantifier (`*`, `+`, `?`, `{m,n}`) with no atom before it,
    /// or stacked directly onto another quantifier (`a**`).
    #[error("nothing to repeat at {location}")]
    DanglingQuantifier { location: Location },

    /// A `(` without its `)` or a stray `)`.
    #[error("unbalanced parenthesis at {location}")]
    UnbalancedParenthesis { location: Location },

    /// The same group name defined twice.
    #[error("redefinition of group name \"{name}\" at {location}")]
    DuplicateGroupName { name: String, location: Location },

    /// A backreference or conditional that names a group which exists
    /// nowhere in the pattern.
    #[error("reference to undefined group \"{reference}\" at {location}")]
    UndefinedGroupReference { reference: String, location: Location },

    /// A lookbehind whose body does not have an inferable fixed width.
    #[error("look-behind requires fixed-width pattern at {location}")]
    VariableLengthLookbehind { location: Location },

    /// An unknown or unsupported escape sequence, including a trailing
    /// bare backslash.
    #[error("bad escape {sequence} at {location}")]
    InvalidEscape { sequence: String, location: Location },

    /// An unterminated `[...]` or a range whose start is greater than
    /// its end.
    #[error("{reason} at {location}")]
    InvalidCharacterClass { reason: String, location: Location },

    /// `{m,n}` with m greater than n.
    #[error("min repeat greater than max repeat at {location}")]
    InvalidQuantifierRange { location: Location },

    /// An unrecognized `(?...` construct, including ill-formed inline
    /// flags such as `(?-i)` without a colon.
    #[error("unknown extension {sequence} at {location}")]
    UnknownExtension { sequence: String, location: Location },

    /// A conditional group `(?(ref)yes|no)` with a second `|`.
    #[error("conditional backref with more than two branches at {location}")]
    MalformedConditional { location: Location },

    /// An empty group name or one containing characters that are not
    /// valid in an identifier.
    #[error("bad group name at {location}")]
    InvalidGroupName { location: Location },
}

/// Caller error: asking a match result for a group the pattern does not
/// define. Distinct from a group that exists but did not participate in
/// the match, which reads as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoSuchGroup {
    #[error("no such group: {0}")]
    Index(usize),

    #[error("no such group: \"{0}\"")]
    Name(String),
}
