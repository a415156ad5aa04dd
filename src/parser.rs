// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::ast::{
    AstNode, CharClass, ClassItem, GroupKind, GroupRef, LookaroundKind, PresetClass,
};
use crate::error::ParseError;
use crate::flags::FlagSet;
use crate::lexer::lex_from_str;
use crate::location::Location;
use crate::peekableiter::PeekableIter;
use crate::rulechecker::{get_match_length, MatchLength};
use crate::token::{Repetition, Token, TokenWithRange};

pub const PARSER_PEEK_TOKEN_MAX_COUNT: usize = 2;

/// The output of parsing: the tree plus everything the compiler needs
/// to know about groups and flags.
#[derive(Debug, PartialEq, Clone)]
pub struct ParsedPattern {
    pub ast: AstNode,
    /// pattern-level flags: the caller's plus all global inline
    /// directives
    pub flags: FlagSet,
    /// number of capture groups, the whole-match group 0 included
    pub group_count: usize,
    /// name-to-index pairs in definition order
    pub group_names: Vec<(String, usize)>,
}

/// Parses a pattern with the given flags in force.
///
/// A global directive such as `(?x)` changes how the whole pattern is
/// tokenized, so lexing repeats with the enlarged flag set until it
/// stops growing. Two passes settle it in practice.
pub fn parse_from_str(pattern: &str, flags: FlagSet) -> Result<ParsedPattern, ParseError> {
    let mut effective = flags;
    let tokens = loop {
        let (tokens, global) = lex_from_str(pattern, effective)?;
        if effective.contains(global) {
            break tokens;
        }
        effective |= global;
    };

    let mut token_iter = tokens.into_iter();
    let mut peekable_token_iter = PeekableIter::new(&mut token_iter, PARSER_PEEK_TOKEN_MAX_COUNT);

    let mut parser = Parser::new(&mut peekable_token_iter, effective);
    parser.parse()
}

struct Parser<'a> {
    upstream: &'a mut PeekableIter<'a, TokenWithRange>,
    last_range: Location,
    flags: FlagSet,

    // group 0 is the whole match, so explicit groups start at 1
    next_group_index: usize,
    group_names: Vec<(String, usize)>,

    // references are checked once the whole pattern is parsed, which
    // lets a backreference or conditional name a group defined later
    references: Vec<(GroupRef, Location)>,
}

impl<'a> Parser<'a> {
    fn new(upstream: &'a mut PeekableIter<'a, TokenWithRange>, flags: FlagSet) -> Self {
        Self {
            upstream,
            last_range: Location::at(0, 0, 0),
            flags,
            next_group_index: 1,
            group_names: vec![],
            references: vec![],
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        match self.upstream.next() {
            Some(TokenWithRange { token, range }) => {
                self.last_range = range;
                Some(token)
            }
            None => None,
        }
    }

    fn peek_token(&self, offset: usize) -> Option<&Token> {
        self.upstream.peek(offset).map(|item| &item.token)
    }

    fn peek_range(&self, offset: usize) -> Option<&Location> {
        self.upstream.peek(offset).map(|item| &item.range)
    }

    fn consume_group_end(&mut self, open: Location) -> Result<(), ParseError> {
        match self.next_token() {
            Some(Token::GroupEnd) => Ok(()),
            _ => Err(ParseError::UnbalancedParenthesis { location: open }),
        }
    }

    fn parse(&mut self) -> Result<ParsedPattern, ParseError> {
        let ast = self.parse_alternation()?;

        // anything left over can only be a stray ')'
        if let Some(range) = self.peek_range(0) {
            return Err(ParseError::UnbalancedParenthesis { location: *range });
        }

        self.validate_references()?;

        Ok(ParsedPattern {
            ast,
            flags: self.flags,
            group_count: self.next_group_index,
            group_names: std::mem::take(&mut self.group_names),
        })
    }

    fn parse_alternation(&mut self) -> Result<AstNode, ParseError> {
        let mut branches = vec![self.parse_concat()?];

        while let Some(Token::LogicOr) = self.peek_token(0) {
            self.next_token(); // consume '|'
            branches.push(self.parse_concat()?);
        }

        if branches.len() == 1 {
            Ok(branches.remove(0))
        } else {
            Ok(AstNode::Alternation(branches))
        }
    }

    fn parse_concat(&mut self) -> Result<AstNode, ParseError> {
        let mut items = vec![];

        loop {
            match self.peek_token(0) {
                None | Some(Token::LogicOr) | Some(Token::GroupEnd) => break,
                Some(_) => items.push(self.parse_quantified()?),
            }
        }

        let mut items = merge_continuous_chars(items);
        match items.len() {
            0 => Ok(AstNode::Empty),
            1 => Ok(items.remove(0)),
            _ => Ok(AstNode::Concat(items)),
        }
    }

    fn parse_quantified(&mut self) -> Result<AstNode, ParseError> {
        if let Some(token) = self.peek_token(0) {
            if is_quantifier(token) {
                // a quantifier with nothing before it
                let location = self.peek_range(0).copied().unwrap_or(self.last_range);
                return Err(ParseError::DanglingQuantifier { location });
            }
        }

        let atom = self.parse_atom()?;

        let (min, max, lazy) = match self.peek_token(0) {
            Some(token) if is_quantifier(token) => quantifier_bounds(token),
            _ => return Ok(atom),
        };
        self.next_token(); // consume the quantifier

        // anchors and boundaries are zero-width, repeating them is
        // always a mistake
        if matches!(
            atom,
            AstNode::LineStart
                | AstNode::LineEnd
                | AstNode::TextStart
                | AstNode::TextEnd
                | AstNode::WordBoundary { .. }
        ) {
            return Err(ParseError::DanglingQuantifier {
                location: self.last_range,
            });
        }

        // so is stacking one quantifier onto another, e.g. `a*+`
        if let Some(token) = self.peek_token(0) {
            if is_quantifier(token) {
                let location = self.peek_range(0).copied().unwrap_or(self.last_range);
                return Err(ParseError::DanglingQuantifier { location });
            }
        }

        Ok(AstNode::Quantified {
            body: Box::new(atom),
            min,
            max,
            lazy,
        })
    }

    fn parse_atom(&mut self) -> Result<AstNode, ParseError> {
        let token = match self.next_token() {
            Some(token) => token,
            None => return Ok(AstNode::Empty),
        };

        match token {
            Token::Char(c) => Ok(AstNode::Char(c)),
            Token::Dot => Ok(AstNode::Dot),
            Token::StartAssertion => Ok(AstNode::LineStart),
            Token::EndAssertion => Ok(AstNode::LineEnd),
            Token::StringStartAssertion => Ok(AstNode::TextStart),
            Token::StringEndAssertion => Ok(AstNode::TextEnd),
            Token::BoundaryAssertion(letter) => Ok(AstNode::WordBoundary {
                negated: letter == 'B',
            }),
            Token::PresetCharSet(letter) => {
                let (preset, negated) = preset_of_letter(letter);
                Ok(AstNode::Class(CharClass::from_preset(preset, negated)))
            }
            Token::ClassStart => self.parse_class(false),
            Token::ClassStartNegated => self.parse_class(true),
            Token::GroupStart => {
                let open = self.last_range;
                let index = self.next_group_index;
                self.next_group_index += 1;

                let body = self.parse_alternation()?;
                self.consume_group_end(open)?;
                Ok(AstNode::Group {
                    kind: GroupKind::Capturing(index),
                    body: Box::new(body),
                })
            }
            Token::NamedCapture(name) => {
                let open = self.last_range;
                if self.group_names.iter().any(|(defined, _)| defined == &name) {
                    return Err(ParseError::DuplicateGroupName {
                        name,
                        location: open,
                    });
                }

                let index = self.next_group_index;
                self.next_group_index += 1;
                self.group_names.push((name.clone(), index));

                let body = self.parse_alternation()?;
                self.consume_group_end(open)?;
                Ok(AstNode::Group {
                    kind: GroupKind::Named(name, index),
                    body: Box::new(body),
                })
            }
            Token::NonCapturing => {
                let open = self.last_range;
                let body = self.parse_alternation()?;
                self.consume_group_end(open)?;
                Ok(AstNode::Group {
                    kind: GroupKind::NonCapturing,
                    body: Box::new(body),
                })
            }
            Token::FlagGroupStart { set, clear } => {
                let open = self.last_range;
                let body = self.parse_alternation()?;
                self.consume_group_end(open)?;
                Ok(AstNode::Group {
                    kind: GroupKind::FlagScope { set, clear },
                    body: Box::new(body),
                })
            }
            Token::LookAhead
            | Token::LookAheadNegative
            | Token::LookBehind
            | Token::LookBehindNegative => {
                let open = self.last_range;
                let kind = match token {
                    Token::LookAhead => LookaroundKind::Ahead,
                    Token::LookAheadNegative => LookaroundKind::AheadNegative,
                    Token::LookBehind => LookaroundKind::Behind,
                    _ => LookaroundKind::BehindNegative,
                };

                let body = self.parse_alternation()?;
                self.consume_group_end(open)?;

                // looking backwards needs to know how far to step back
                let length = match kind {
                    LookaroundKind::Behind | LookaroundKind::BehindNegative => {
                        match get_match_length(&body) {
                            MatchLength::Fixed(n) => n,
                            MatchLength::Variable => {
                                return Err(ParseError::VariableLengthLookbehind {
                                    location: open,
                                });
                            }
                        }
                    }
                    _ => 0,
                };

                Ok(AstNode::Lookaround {
                    kind,
                    body: Box::new(body),
                    length,
                })
            }
            Token::ConditionalIndex(index) => {
                let open = self.last_range;
                let reference = GroupRef::Index(index);
                self.references.push((reference.clone(), open));
                self.parse_conditional_branches(reference, open)
            }
            Token::ConditionalName(name) => {
                let open = self.last_range;
                let reference = GroupRef::Name(name);
                self.references.push((reference.clone(), open));
                self.parse_conditional_branches(reference, open)
            }
            Token::BackReferenceNumber(index) => {
                let reference = GroupRef::Index(index);
                self.references.push((reference.clone(), self.last_range));
                Ok(AstNode::Backreference(reference))
            }
            Token::BackReferenceIdentifier(name) => {
                let reference = GroupRef::Name(name);
                self.references.push((reference.clone(), self.last_range));
                Ok(AstNode::Backreference(reference))
            }
            // class members never escape parse_class, and GroupEnd and
            // LogicOr stop parse_concat before parse_atom runs
            _ => Err(ParseError::UnbalancedParenthesis {
                location: self.last_range,
            }),
        }
    }

    fn parse_class(&mut self, negated: bool) -> Result<AstNode, ParseError> {
        let mut items = vec![];

        loop {
            match self.next_token() {
                Some(Token::ClassEnd) => break,
                Some(Token::Char(c)) => items.push(ClassItem::Char(c)),
                Some(Token::CharRange(start, end)) => items.push(ClassItem::Range(start, end)),
                Some(Token::PresetCharSet(letter)) => {
                    let (preset, preset_negated) = preset_of_letter(letter);
                    items.push(if preset_negated {
                        ClassItem::PresetNegated(preset)
                    } else {
                        ClassItem::Preset(preset)
                    });
                }
                // the lexer only emits class members between the
                // bracket tokens
                _ => {
                    return Err(ParseError::InvalidCharacterClass {
                        reason: "unterminated character set".to_string(),
                        location: self.last_range,
                    });
                }
            }
        }

        Ok(AstNode::Class(CharClass::new(negated, items)))
    }

    /// The `yes|no` tail of a conditional, the closing ')' included.
    /// Each branch is a plain concatenation; a second '|' is refused.
    fn parse_conditional_branches(
        &mut self,
        reference: GroupRef,
        open: Location,
    ) -> Result<AstNode, ParseError> {
        let yes = self.parse_concat()?;

        let no = match self.peek_token(0) {
            Some(Token::LogicOr) => {
                self.next_token(); // consume '|'
                let no = self.parse_concat()?;
                if let Some(Token::LogicOr) = self.peek_token(0) {
                    return Err(ParseError::MalformedConditional { location: open });
                }
                no
            }
            _ => AstNode::Empty,
        };

        self.consume_group_end(open)?;

        Ok(AstNode::Conditional {
            reference,
            yes: Box::new(yes),
            no: Box::new(no),
        })
    }

    fn validate_references(&self) -> Result<(), ParseError> {
        for (reference, location) in &self.references {
            let defined = match reference {
                GroupRef::Index(index) => *index >= 1 && *index < self.next_group_index,
                GroupRef::Name(name) => {
                    self.group_names.iter().any(|(defined, _)| defined == name)
                }
            };

            if !defined {
                let reference = match reference {
                    GroupRef::Index(index) => index.to_string(),
                    GroupRef::Name(name) => name.clone(),
                };
                return Err(ParseError::UndefinedGroupReference {
                    reference,
                    location: *location,
                });
            }
        }

        Ok(())
    }
}

fn is_quantifier(token: &Token) -> bool {
    matches!(
        token,
        Token::Optional(_) | Token::OneOrMore(_) | Token::ZeroOrMore(_) | Token::Repetition(..)
    )
}

fn quantifier_bounds(token: &Token) -> (usize, Option<usize>, bool) {
    match token {
        Token::Optional(lazy) => (0, Some(1), *lazy),
        Token::OneOrMore(lazy) => (1, None, *lazy),
        Token::ZeroOrMore(lazy) => (0, None, *lazy),
        Token::Repetition(repetition, lazy) => match repetition {
            Repetition::Specified(times) => (*times, Some(*times), *lazy),
            Repetition::AtLeast(from) => (*from, None, *lazy),
            Repetition::AtMost(to) => (0, Some(*to), *lazy),
            Repetition::Range(from, to) => (*from, Some(*to), *lazy),
        },
        _ => (0, None, false),
    }
}

fn preset_of_letter(letter: char) -> (PresetClass, bool) {
    match letter {
        'd' => (PresetClass::Digit, false),
        'D' => (PresetClass::Digit, true),
        's' => (PresetClass::Space, false),
        'S' => (PresetClass::Space, true),
        'W' => (PresetClass::Word, true),
        _ => (PresetClass::Word, false), // 'w'
    }
}

/// Collapses runs of adjacent literal chars into string nodes.
/// Quantified chars were already wrapped by this point, so they keep
/// their own node.
fn merge_continuous_chars(items: Vec<AstNode>) -> Vec<AstNode> {
    let mut merged: Vec<AstNode> = vec![];

    for item in items {
        match item {
            AstNode::Char(c) => match merged.last_mut() {
                Some(AstNode::Str(s)) => s.push(c),
                Some(AstNode::Char(_)) => {
                    if let Some(AstNode::Char(previous)) = merged.pop() {
                        let mut s = String::with_capacity(2);
                        s.push(previous);
                        s.push(c);
                        merged.push(AstNode::Str(s));
                    }
                }
                _ => merged.push(AstNode::Char(c)),
            },
            other => merged.push(other),
        }
    }

    merged
}
