// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

/// A place in the pattern text, counted in characters.
///
/// `line` and `column` are zero-based and only diverge from the plain
/// offset when the pattern itself spans several lines, which happens
/// with VERBOSE patterns. `length` is the number of characters the
/// location covers; a bare position has length 0.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Location {
    pub fn new(offset: usize, line: usize, column: usize, length: usize) -> Self {
        Self {
            offset,
            line,
            column,
            length,
        }
    }

    /// A zero-length position.
    pub fn at(offset: usize, line: usize, column: usize) -> Self {
        Self::new(offset, line, column, 0)
    }

    /// The same position covering `length` characters.
    pub fn with_length(&self, length: usize) -> Self {
        Self::new(self.offset, self.line, self.column, length)
    }

    /// The range from `start` up to and including the character at
    /// `end_included`.
    pub fn span(start: &Location, end_included: &Location) -> Self {
        Self::new(
            start.offset,
            start.line,
            start.column,
            end_included.offset - start.offset + 1,
        )
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "position {}", self.offset)
        } else {
            write!(
                f,
                "position {} (line {}, column {})",
                self.offset,
                self.line + 1,
                self.column + 1
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Location;

    #[test]
    fn test_location_span() {
        let start = Location::at(2, 0, 2);
        let end = Location::at(5, 0, 5);
        assert_eq!(Location::span(&start, &end), Location::new(2, 0, 2, 4));
        assert_eq!(Location::span(&start, &start), Location::new(2, 0, 2, 1));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::at(7, 0, 7).to_string(), "position 7");
        assert_eq!(
            Location::at(12, 2, 3).to_string(),
            "position 12 (line 3, column 4)"
        );
    }
}
