// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::ops::{Add, BitOr, Mul};

use crate::ast::AstNode;

/// The number of characters a subpattern consumes, when that number is
/// the same for every way the subpattern can match. Lookbehind bodies
/// must have a `Fixed` length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchLength {
    Variable,
    // length in chars, not bytes
    Fixed(usize),
}

impl Add for MatchLength {
    type Output = MatchLength;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) => MatchLength::Fixed(v0 + v1),
            _ => MatchLength::Variable,
        }
    }
}

impl Mul<usize> for MatchLength {
    type Output = MatchLength;

    fn mul(self, rhs: usize) -> Self::Output {
        match self {
            MatchLength::Variable => MatchLength::Variable,
            MatchLength::Fixed(v) => MatchLength::Fixed(v * rhs),
        }
    }
}

impl BitOr for MatchLength {
    type Output = MatchLength;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) if v0 == v1 => MatchLength::Fixed(v0),
            _ => MatchLength::Variable,
        }
    }
}

pub fn get_match_length(node: &AstNode) -> MatchLength {
    match node {
        AstNode::Char(_) | AstNode::Class(_) | AstNode::Dot => MatchLength::Fixed(1),
        AstNode::Str(s) => MatchLength::Fixed(s.chars().count()),
        AstNode::LineStart
        | AstNode::LineEnd
        | AstNode::TextStart
        | AstNode::TextEnd
        | AstNode::WordBoundary { .. }
        | AstNode::Lookaround { .. }
        | AstNode::Empty => MatchLength::Fixed(0),
        AstNode::Concat(nodes) => nodes
            .iter()
            .fold(MatchLength::Fixed(0), |acc, node| {
                acc + get_match_length(node)
            }),
        AstNode::Alternation(branches) => branches
            .iter()
            .map(get_match_length)
            .reduce(|acc, length| acc | length)
            .unwrap_or(MatchLength::Fixed(0)),
        AstNode::Group { body, .. } => get_match_length(body),
        AstNode::Quantified {
            body,
            min,
            max: Some(max),
            ..
        } if min == max => get_match_length(body) * *min,
        AstNode::Quantified { .. } => MatchLength::Variable,
        // the referenced group can capture anything
        AstNode::Backreference(_) => MatchLength::Variable,
        AstNode::Conditional { yes, no, .. } => get_match_length(yes) | get_match_length(no),
    }
}
