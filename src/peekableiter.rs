// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::collections::VecDeque;

/// An iterator adapter with a fixed look-ahead window.
///
/// `peek(0)` is the item the next `next()` call will return, `peek(1)`
/// the one after it, and so on up to `peek(depth - 1)`. The window is
/// kept full eagerly so peeking needs no mutable access.
pub struct PeekableIter<'a, T> {
    upstream: &'a mut dyn Iterator<Item = T>,
    buffer: VecDeque<T>,
    depth: usize,
}

impl<'a, T> PeekableIter<'a, T> {
    pub fn new(upstream: &'a mut dyn Iterator<Item = T>, depth: usize) -> Self {
        let mut buffer = VecDeque::with_capacity(depth);
        for _ in 0..depth {
            match upstream.next() {
                Some(item) => buffer.push_back(item),
                None => break,
            }
        }

        Self {
            upstream,
            buffer,
            depth,
        }
    }

    /// Looks at the item `offset` places ahead without consuming
    /// anything. `offset` must be less than the window depth.
    pub fn peek(&self, offset: usize) -> Option<&T> {
        assert!(offset < self.depth);
        self.buffer.get(offset)
    }
}

impl<T> Iterator for PeekableIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.pop_front();
        if let Some(refill) = self.upstream.next() {
            self.buffer.push_back(refill);
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::PeekableIter;

    #[test]
    fn test_peek_and_next() {
        let mut upstream = "abcde".chars();
        let mut iter = PeekableIter::new(&mut upstream, 3);

        assert_eq!(iter.peek(0), Some(&'a'));
        assert_eq!(iter.peek(1), Some(&'b'));
        assert_eq!(iter.peek(2), Some(&'c'));

        assert_eq!(iter.next(), Some('a'));
        assert_eq!(iter.peek(0), Some(&'b'));
        assert_eq!(iter.peek(2), Some(&'d'));

        assert_eq!(iter.next(), Some('b'));
        assert_eq!(iter.next(), Some('c'));
        assert_eq!(iter.next(), Some('d'));

        // the window shrinks as the upstream runs dry
        assert_eq!(iter.peek(0), Some(&'e'));
        assert_eq!(iter.peek(1), None);
        assert_eq!(iter.next(), Some('e'));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.peek(0), None);
    }
}
