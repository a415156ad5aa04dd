// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::location::Location;

/// A pattern character together with the place it was read from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CharWithPosition {
    pub character: char,
    pub position: Location,
}

impl CharWithPosition {
    pub fn new(character: char, position: Location) -> Self {
        Self {
            character,
            position,
        }
    }
}

/// Adds positions to a plain character stream, advancing line and
/// column over `\n`.
pub struct CharsWithPositionIter<'a> {
    upstream: &'a mut dyn Iterator<Item = char>,
    current: Location,
}

impl<'a> CharsWithPositionIter<'a> {
    pub fn new(upstream: &'a mut dyn Iterator<Item = char>) -> Self {
        Self {
            upstream,
            current: Location::at(0, 0, 0),
        }
    }
}

impl Iterator for CharsWithPositionIter<'_> {
    type Item = CharWithPosition;

    fn next(&mut self) -> Option<Self::Item> {
        self.upstream.next().map(|character| {
            let position = self.current;

            self.current.offset += 1;
            if character == '\n' {
                self.current.line += 1;
                self.current.column = 0;
            } else {
                self.current.column += 1;
            }

            CharWithPosition::new(character, position)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::location::Location;

    use super::{CharWithPosition, CharsWithPositionIter};

    #[test]
    fn test_chars_with_position_iter() {
        let mut chars = "a\nxy".chars();
        let mut iter = CharsWithPositionIter::new(&mut chars);

        assert_eq!(
            iter.next(),
            Some(CharWithPosition::new('a', Location::at(0, 0, 0)))
        );
        assert_eq!(
            iter.next(),
            Some(CharWithPosition::new('\n', Location::at(1, 0, 1)))
        );
        assert_eq!(
            iter.next(),
            Some(CharWithPosition::new('x', Location::at(2, 1, 0)))
        );
        assert_eq!(
            iter.next(),
            Some(CharWithPosition::new('y', Location::at(3, 1, 1)))
        );
        assert_eq!(iter.next(), None);
    }
}
