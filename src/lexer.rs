// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::charwithposition::{CharWithPosition, CharsWithPositionIter};
use crate::error::ParseError;
use crate::flags::FlagSet;
use crate::location::Location;
use crate::peekableiter::PeekableIter;
use crate::token::{Repetition, Token, TokenWithRange};

pub const LEXER_PEEK_CHAR_MAX_COUNT: usize = 3;

/// Turns the pattern text into tokens with `flags` in force.
///
/// Returns the tokens together with the union of global inline
/// directives (`(?ims)` style) found along the way. A directive can add
/// VERBOSE, which changes tokenization retroactively; the caller is
/// expected to lex again with the enlarged set until it stops growing.
pub fn lex_from_str(
    pattern: &str,
    flags: FlagSet,
) -> Result<(Vec<TokenWithRange>, FlagSet), ParseError> {
    let mut chars = pattern.chars();
    let mut char_position_iter = CharsWithPositionIter::new(&mut chars);
    let mut peekable_char_position_iter =
        PeekableIter::new(&mut char_position_iter, LEXER_PEEK_CHAR_MAX_COUNT);

    let mut lexer = Lexer::new(&mut peekable_char_position_iter, flags);
    let tokens = lexer.lex()?;
    Ok((tokens, lexer.global_flags))
}

struct Lexer<'a> {
    upstream: &'a mut PeekableIter<'a, CharWithPosition>,
    last_position: Location,
    saved_positions: Vec<Location>,

    // VERBOSE state, tracked here because `(?x:...)` scopes change how
    // the rest of the pattern is tokenized. Every group-opening token
    // pushes the current state; `)` pops it.
    verbose: bool,
    verbose_stack: Vec<bool>,

    // union of global `(?...)` directives seen so far
    global_flags: FlagSet,
}

impl<'a> Lexer<'a> {
    fn new(upstream: &'a mut PeekableIter<'a, CharWithPosition>, flags: FlagSet) -> Self {
        Self {
            upstream,
            last_position: Location::at(0, 0, 0),
            saved_positions: vec![],
            verbose: flags.contains(FlagSet::VERBOSE),
            verbose_stack: vec![],
            global_flags: FlagSet::empty(),
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.upstream.next() {
            Some(CharWithPosition {
                character,
                position,
            }) => {
                self.last_position = position;
                Some(character)
            }
            None => None,
        }
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.upstream.peek(offset).map(|item| item.character)
    }

    fn peek_position(&self, offset: usize) -> Option<Location> {
        self.upstream.peek(offset).map(|item| item.position)
    }

    fn push_peek_position(&mut self) {
        let position = self.peek_position(0).unwrap_or_else(|| self.eof_location());
        self.saved_positions.push(position);
    }

    fn pop_saved_position(&mut self) -> Location {
        match self.saved_positions.pop() {
            Some(position) => position,
            None => self.last_position,
        }
    }

    /// One past the last consumed character.
    fn eof_location(&self) -> Location {
        Location::at(
            self.last_position.offset + 1,
            self.last_position.line,
            self.last_position.column + 1,
        )
    }

    fn enter_group(&mut self) {
        self.verbose_stack.push(self.verbose);
    }

    fn leave_group(&mut self) {
        if let Some(verbose) = self.verbose_stack.pop() {
            self.verbose = verbose;
        }
    }

    fn lex(&mut self) -> Result<Vec<TokenWithRange>, ParseError> {
        let mut token_with_ranges = vec![];

        while let Some(current_char) = self.peek_char(0) {
            match current_char {
                _ if self.verbose && is_pattern_whitespace(current_char) => {
                    self.next_char();
                }
                '#' if self.verbose => {
                    // comment runs to the end of the line
                    while let Some(c) = self.next_char() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                '\\' => {
                    token_with_ranges.push(self.lex_escape()?);
                }
                '[' => {
                    let mut class_tokens = self.lex_charset()?;
                    token_with_ranges.append(&mut class_tokens);
                }
                '{' => {
                    let mut repetition_tokens = self.lex_repetition()?;
                    token_with_ranges.append(&mut repetition_tokens);
                }
                '(' => {
                    self.lex_group(&mut token_with_ranges)?;
                }
                ')' => {
                    self.next_char(); // consume ')'
                    self.leave_group();
                    token_with_ranges.push(TokenWithRange::from_position_and_length(
                        Token::GroupEnd,
                        &self.last_position,
                        1,
                    ));
                }
                '^' | '$' | '.' | '|' => {
                    self.next_char();
                    let token = match current_char {
                        '^' => Token::StartAssertion,
                        '$' => Token::EndAssertion,
                        '.' => Token::Dot,
                        _ => Token::LogicOr,
                    };
                    token_with_ranges.push(TokenWithRange::from_position_and_length(
                        token,
                        &self.last_position,
                        1,
                    ));
                }
                '?' | '+' | '*' => {
                    self.push_peek_position();
                    self.next_char();
                    let lazy = if self.peek_char(0) == Some('?') {
                        self.next_char(); // consume the lazy marker
                        true
                    } else {
                        false
                    };
                    let token = match current_char {
                        '?' => Token::Optional(lazy),
                        '+' => Token::OneOrMore(lazy),
                        _ => Token::ZeroOrMore(lazy),
                    };
                    token_with_ranges.push(TokenWithRange::new(
                        token,
                        Location::span(&self.pop_saved_position(), &self.last_position),
                    ));
                }
                _ => {
                    // any other character, including ']' and '}', is a
                    // literal here
                    self.next_char();
                    token_with_ranges.push(TokenWithRange::from_position_and_length(
                        Token::Char(current_char),
                        &self.last_position,
                        1,
                    ));
                }
            }
        }

        Ok(token_with_ranges)
    }

    fn lex_escape(&mut self) -> Result<TokenWithRange, ParseError> {
        // \x ?
        // ^
        // |__ current char, validated

        self.push_peek_position();
        self.next_char(); // consume '\\'

        let token = match self.peek_char(0) {
            None => {
                return Err(ParseError::InvalidEscape {
                    sequence: "\\".to_string(),
                    location: self.pop_saved_position().with_length(1),
                });
            }
            Some(c) => match c {
                't' | 'n' | 'r' | 'f' | 'v' | 'a' => {
                    self.next_char();
                    Token::Char(control_escape(c))
                }
                'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                    self.next_char();
                    Token::PresetCharSet(c)
                }
                'b' | 'B' => {
                    self.next_char();
                    Token::BoundaryAssertion(c)
                }
                'A' => {
                    self.next_char();
                    Token::StringStartAssertion
                }
                'Z' => {
                    self.next_char();
                    Token::StringEndAssertion
                }
                'x' => {
                    self.next_char();
                    Token::Char(self.lex_hex_digits(2, "\\x")?)
                }
                'u' => {
                    self.next_char();
                    Token::Char(self.lex_hex_digits(4, "\\u")?)
                }
                'k' => {
                    self.next_char();
                    if self.peek_char(0) == Some('<') {
                        self.next_char(); // consume '<'
                        let name = self.lex_identifier('>')?;
                        Token::BackReferenceIdentifier(name)
                    } else {
                        return Err(ParseError::InvalidEscape {
                            sequence: "\\k".to_string(),
                            location: Location::span(
                                &self.pop_saved_position(),
                                &self.last_position,
                            ),
                        });
                    }
                }
                '1'..='9' => {
                    // at most two digits make up a group number
                    let mut number = 0_usize;
                    let mut digits = 0;
                    while digits < 2 {
                        match self.peek_char(0) {
                            Some(d) if d.is_ascii_digit() => {
                                self.next_char();
                                number = number * 10 + d.to_digit(10).unwrap() as usize;
                                digits += 1;
                            }
                            _ => break,
                        }
                    }
                    Token::BackReferenceNumber(number)
                }
                _ if c.is_ascii_alphanumeric() => {
                    // unknown letter/digit escapes are refused, octal
                    // escapes (leading 0) included
                    self.next_char();
                    return Err(ParseError::InvalidEscape {
                        sequence: format!("\\{}", c),
                        location: Location::span(&self.pop_saved_position(), &self.last_position),
                    });
                }
                _ => {
                    // identity escape: punctuation, whitespace and
                    // anything beyond ASCII stand for themselves
                    self.next_char();
                    Token::Char(c)
                }
            },
        };

        Ok(TokenWithRange::new(
            token,
            Location::span(&self.pop_saved_position(), &self.last_position),
        ))
    }

    fn lex_hex_digits(&mut self, count: usize, prefix: &str) -> Result<char, ParseError> {
        let mut sequence = prefix.to_string();
        let mut value = 0_u32;

        for _ in 0..count {
            match self.next_char() {
                Some(c) => match c.to_digit(16) {
                    Some(digit) => {
                        sequence.push(c);
                        value = value * 16 + digit;
                    }
                    None => {
                        sequence.push(c);
                        return Err(ParseError::InvalidEscape {
                            sequence,
                            location: self.last_position.with_length(1),
                        });
                    }
                },
                None => {
                    return Err(ParseError::InvalidEscape {
                        sequence,
                        location: self.eof_location(),
                    });
                }
            }
        }

        match char::from_u32(value) {
            Some(c) => Ok(c),
            None => Err(ParseError::InvalidEscape {
                sequence,
                location: self.last_position.with_length(1),
            }),
        }
    }

    /// Lexes a group name up to and including `terminator`.
    fn lex_identifier(&mut self, terminator: char) -> Result<String, ParseError> {
        let start_location = self.peek_position(0).unwrap_or_else(|| self.eof_location());
        let mut name = String::new();

        loop {
            match self.peek_char(0) {
                Some(c) if c == terminator => {
                    self.next_char();
                    break;
                }
                Some(c) if c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii() => {
                    self.next_char();
                    name.push(c);
                }
                Some(_) => {
                    return Err(ParseError::InvalidGroupName {
                        location: self.peek_position(0).unwrap_or_else(|| self.eof_location()),
                    });
                }
                None => {
                    return Err(ParseError::InvalidGroupName {
                        location: self.eof_location(),
                    });
                }
            }
        }

        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(ParseError::InvalidGroupName {
                location: start_location,
            });
        }

        Ok(name)
    }

    fn lex_charset(&mut self) -> Result<Vec<TokenWithRange>, ParseError> {
        // [^ a-z ... ]
        // ^          ^
        // |__________|__ to here
        // |
        // |__ current char, validated

        let open_position = self.peek_position(0).unwrap_or_else(|| self.eof_location());
        self.next_char(); // consume '['

        let mut tokens = vec![];

        let negated = self.peek_char(0) == Some('^');
        if negated {
            self.next_char(); // consume '^'
            tokens.push(TokenWithRange::new(
                Token::ClassStartNegated,
                Location::span(&open_position, &self.last_position),
            ));
        } else {
            tokens.push(TokenWithRange::new(
                Token::ClassStart,
                open_position.with_length(1),
            ));
        }

        let unterminated = |location: Location| ParseError::InvalidCharacterClass {
            reason: "unterminated character set".to_string(),
            location,
        };

        let mut first_member = true;
        loop {
            let member_start = match self.peek_position(0) {
                Some(position) => position,
                None => return Err(unterminated(open_position.with_length(1))),
            };

            let member = match self.peek_char(0) {
                // ']' right after '[' or '[^' is a member, not the end
                Some(']') if !first_member => {
                    self.next_char();
                    tokens.push(TokenWithRange::from_position_and_length(
                        Token::ClassEnd,
                        &self.last_position,
                        1,
                    ));
                    break;
                }
                Some('\\') => self.lex_charset_escape()?,
                Some(c) => {
                    self.next_char();
                    Token::Char(c)
                }
                None => return Err(unterminated(open_position.with_length(1))),
            };
            first_member = false;

            // a '-' between two members makes a range, unless it sits
            // right before ']'
            let member = match member {
                Token::Char(range_start)
                    if self.peek_char(0) == Some('-')
                        && self.peek_char(1).is_some()
                        && self.peek_char(1) != Some(']') =>
                {
                    self.next_char(); // consume '-'

                    let end_member = match self.peek_char(0) {
                        Some('\\') => self.lex_charset_escape()?,
                        Some(c) => {
                            self.next_char();
                            Token::Char(c)
                        }
                        None => return Err(unterminated(open_position.with_length(1))),
                    };

                    let range_end = match end_member {
                        Token::Char(c) => c,
                        _ => {
                            return Err(ParseError::InvalidCharacterClass {
                                reason: "bad character range".to_string(),
                                location: Location::span(&member_start, &self.last_position),
                            });
                        }
                    };

                    if range_end < range_start {
                        return Err(ParseError::InvalidCharacterClass {
                            reason: format!("bad character range {}-{}", range_start, range_end),
                            location: Location::span(&member_start, &self.last_position),
                        });
                    }

                    Token::CharRange(range_start, range_end)
                }
                // a range cannot start at a preset class, so `[\d-z]`
                // is an error rather than a literal '-'
                Token::PresetCharSet(_)
                    if self.peek_char(0) == Some('-')
                        && self.peek_char(1).is_some()
                        && self.peek_char(1) != Some(']') =>
                {
                    return Err(ParseError::InvalidCharacterClass {
                        reason: "bad character range".to_string(),
                        location: Location::span(&member_start, &self.last_position),
                    });
                }
                other => other,
            };

            tokens.push(TokenWithRange::new(
                member,
                Location::span(&member_start, &self.last_position),
            ));
        }

        Ok(tokens)
    }

    fn lex_charset_escape(&mut self) -> Result<Token, ParseError> {
        self.push_peek_position();
        self.next_char(); // consume '\\'

        let token = match self.peek_char(0) {
            None => {
                return Err(ParseError::InvalidEscape {
                    sequence: "\\".to_string(),
                    location: self.pop_saved_position().with_length(1),
                });
            }
            Some(c) => match c {
                't' | 'n' | 'r' | 'f' | 'v' | 'a' => {
                    self.next_char();
                    Token::Char(control_escape(c))
                }
                // inside a class, \b is the backspace character
                'b' => {
                    self.next_char();
                    Token::Char('\u{8}')
                }
                'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                    self.next_char();
                    Token::PresetCharSet(c)
                }
                'x' => {
                    self.next_char();
                    Token::Char(self.lex_hex_digits(2, "\\x")?)
                }
                'u' => {
                    self.next_char();
                    Token::Char(self.lex_hex_digits(4, "\\u")?)
                }
                _ if c.is_ascii_alphanumeric() => {
                    self.next_char();
                    return Err(ParseError::InvalidEscape {
                        sequence: format!("\\{}", c),
                        location: Location::span(&self.pop_saved_position(), &self.last_position),
                    });
                }
                _ => {
                    self.next_char();
                    Token::Char(c)
                }
            },
        };

        self.pop_saved_position();
        Ok(token)
    }

    /// Lexes `{m}`, `{m,}`, `{,n}` or `{m,n}`, where `{,}` counts as
    /// `{0,}`. A brace run that does not fit any of these is literal
    /// text, as in Python's `re`, so the consumed characters are
    /// returned as plain chars.
    fn lex_repetition(&mut self) -> Result<Vec<TokenWithRange>, ParseError> {
        self.push_peek_position();
        self.next_char(); // consume '{'

        let mut literals = vec![TokenWithRange::from_position_and_length(
            Token::Char('{'),
            &self.last_position,
            1,
        )];

        let mut body = String::new();
        let closed = loop {
            match self.peek_char(0) {
                Some(c) if c.is_ascii_digit() || c == ',' => {
                    self.next_char();
                    body.push(c);
                    literals.push(TokenWithRange::from_position_and_length(
                        Token::Char(c),
                        &self.last_position,
                        1,
                    ));
                }
                Some('}') => {
                    self.next_char();
                    break true;
                }
                _ => break false,
            }
        };

        if !closed {
            self.pop_saved_position();
            return Ok(literals);
        }

        let repetition = match parse_repetition_body(&body) {
            Some(repetition) => repetition,
            None => {
                // e.g. "{}" or "{1,2,3}"
                literals.push(TokenWithRange::from_position_and_length(
                    Token::Char('}'),
                    &self.last_position,
                    1,
                ));
                self.pop_saved_position();
                return Ok(literals);
            }
        };

        let lazy = if self.peek_char(0) == Some('?') {
            self.next_char();
            true
        } else {
            false
        };

        let range = Location::span(&self.pop_saved_position(), &self.last_position);

        if let Repetition::Range(from, to) = repetition {
            if from > to {
                return Err(ParseError::InvalidQuantifierRange { location: range });
            }
        }

        Ok(vec![TokenWithRange::new(
            Token::Repetition(repetition, lazy),
            range,
        )])
    }

    fn lex_group(&mut self, output: &mut Vec<TokenWithRange>) -> Result<(), ParseError> {
        // (?P<name> ...
        // ^^
        // ||__ decides the construct
        // |__ current char, validated

        self.push_peek_position();
        self.next_char(); // consume '('

        if self.peek_char(0) != Some('?') {
            self.enter_group();
            output.push(TokenWithRange::from_position_and_length(
                Token::GroupStart,
                &self.last_position,
                1,
            ));
            self.pop_saved_position();
            return Ok(());
        }

        self.next_char(); // consume '?'

        match self.peek_char(0) {
            None => Err(ParseError::UnbalancedParenthesis {
                location: self.pop_saved_position().with_length(1),
            }),
            Some(':') => {
                self.next_char();
                self.enter_group();
                output.push(TokenWithRange::new(
                    Token::NonCapturing,
                    Location::span(&self.pop_saved_position(), &self.last_position),
                ));
                Ok(())
            }
            Some('=') => {
                self.next_char();
                self.enter_group();
                output.push(TokenWithRange::new(
                    Token::LookAhead,
                    Location::span(&self.pop_saved_position(), &self.last_position),
                ));
                Ok(())
            }
            Some('!') => {
                self.next_char();
                self.enter_group();
                output.push(TokenWithRange::new(
                    Token::LookAheadNegative,
                    Location::span(&self.pop_saved_position(), &self.last_position),
                ));
                Ok(())
            }
            Some('#') => {
                // comment group, dropped entirely; ends at the first ')'
                self.next_char();
                loop {
                    match self.next_char() {
                        Some(')') => break,
                        Some(_) => continue,
                        None => {
                            return Err(ParseError::UnbalancedParenthesis {
                                location: self.pop_saved_position().with_length(1),
                            });
                        }
                    }
                }
                self.pop_saved_position();
                Ok(())
            }
            Some('<') => {
                self.next_char(); // consume '<'
                match self.peek_char(0) {
                    Some('=') => {
                        self.next_char();
                        self.enter_group();
                        output.push(TokenWithRange::new(
                            Token::LookBehind,
                            Location::span(&self.pop_saved_position(), &self.last_position),
                        ));
                        Ok(())
                    }
                    Some('!') => {
                        self.next_char();
                        self.enter_group();
                        output.push(TokenWithRange::new(
                            Token::LookBehindNegative,
                            Location::span(&self.pop_saved_position(), &self.last_position),
                        ));
                        Ok(())
                    }
                    Some(_) => {
                        let name = self.lex_identifier('>')?;
                        self.enter_group();
                        output.push(TokenWithRange::new(
                            Token::NamedCapture(name),
                            Location::span(&self.pop_saved_position(), &self.last_position),
                        ));
                        Ok(())
                    }
                    None => Err(ParseError::UnbalancedParenthesis {
                        location: self.pop_saved_position().with_length(1),
                    }),
                }
            }
            Some('P') => {
                self.next_char(); // consume 'P'
                match self.peek_char(0) {
                    Some('<') => {
                        self.next_char();
                        let name = self.lex_identifier('>')?;
                        self.enter_group();
                        output.push(TokenWithRange::new(
                            Token::NamedCapture(name),
                            Location::span(&self.pop_saved_position(), &self.last_position),
                        ));
                        Ok(())
                    }
                    Some('=') => {
                        // (?P=name) is a complete backreference, the
                        // closing ')' included
                        self.next_char();
                        let name = self.lex_identifier(')')?;
                        output.push(TokenWithRange::new(
                            Token::BackReferenceIdentifier(name),
                            Location::span(&self.pop_saved_position(), &self.last_position),
                        ));
                        Ok(())
                    }
                    other => {
                        let sequence = match other {
                            Some(c) => format!("?P{}", c),
                            None => "?P".to_string(),
                        };
                        Err(ParseError::UnknownExtension {
                            sequence,
                            location: Location::span(&self.pop_saved_position(), &self.last_position),
                        })
                    }
                }
            }
            Some('(') => {
                self.next_char(); // consume the condition's '('
                let reference = self.lex_conditional_reference()?;
                self.enter_group();
                output.push(TokenWithRange::new(
                    reference,
                    Location::span(&self.pop_saved_position(), &self.last_position),
                ));
                Ok(())
            }
            Some(c) if c == '-' || FlagSet::from_inline_letter(c).is_some() => {
                self.lex_inline_flags(output)
            }
            Some(c) => {
                self.next_char();
                Err(ParseError::UnknownExtension {
                    sequence: format!("?{}", c),
                    location: Location::span(&self.pop_saved_position(), &self.last_position),
                })
            }
        }
    }

    /// The `n` or `name` of `(?(n)...)`, the closing ')' of the
    /// condition included.
    fn lex_conditional_reference(&mut self) -> Result<Token, ParseError> {
        let start_location = self.peek_position(0).unwrap_or_else(|| self.eof_location());
        let mut raw = String::new();

        loop {
            match self.peek_char(0) {
                Some(')') => {
                    self.next_char();
                    break;
                }
                Some(c) if c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii() => {
                    self.next_char();
                    raw.push(c);
                }
                Some(_) => {
                    return Err(ParseError::InvalidGroupName {
                        location: self.peek_position(0).unwrap_or_else(|| self.eof_location()),
                    });
                }
                None => {
                    return Err(ParseError::UnbalancedParenthesis {
                        location: self.eof_location(),
                    });
                }
            }
        }

        if raw.is_empty() {
            return Err(ParseError::InvalidGroupName {
                location: start_location,
            });
        }

        if raw.chars().all(|c| c.is_ascii_digit()) {
            match raw.parse::<usize>() {
                Ok(index) => Ok(Token::ConditionalIndex(index)),
                Err(_) => Err(ParseError::InvalidGroupName {
                    location: start_location,
                }),
            }
        } else if raw.starts_with(|c: char| c.is_ascii_digit()) {
            Err(ParseError::InvalidGroupName {
                location: start_location,
            })
        } else {
            Ok(Token::ConditionalName(raw))
        }
    }

    /// Inline flags after `(?`: a global directive `(?ims)` or a scoped
    /// group `(?ims-x:`. The saved position of the opening '(' is on
    /// the stack.
    fn lex_inline_flags(&mut self, output: &mut Vec<TokenWithRange>) -> Result<(), ParseError> {
        let mut set = FlagSet::empty();
        let mut clear = FlagSet::empty();
        let mut clearing = false;
        let mut seen_letter = false;
        let mut sequence = "?".to_string();

        loop {
            match self.peek_char(0) {
                Some(')') | Some(':') => break,
                Some('-') if !clearing => {
                    self.next_char();
                    sequence.push('-');
                    clearing = true;
                }
                Some(c) => match FlagSet::from_inline_letter(c) {
                    Some(flag) => {
                        self.next_char();
                        sequence.push(c);
                        seen_letter = true;
                        if clearing {
                            clear |= flag;
                        } else {
                            set |= flag;
                        }
                    }
                    None => {
                        self.next_char();
                        sequence.push(c);
                        return Err(ParseError::UnknownExtension {
                            sequence,
                            location: Location::span(
                                &self.pop_saved_position(),
                                &self.last_position,
                            ),
                        });
                    }
                },
                None => {
                    return Err(ParseError::UnbalancedParenthesis {
                        location: self.pop_saved_position().with_length(1),
                    });
                }
            }
        }

        match self.peek_char(0) {
            Some(')') => {
                self.next_char();
                // a global directive sets flags for the whole pattern;
                // clearing is only allowed in the scoped form
                if clearing || !seen_letter {
                    return Err(ParseError::UnknownExtension {
                        sequence,
                        location: Location::span(&self.pop_saved_position(), &self.last_position),
                    });
                }
                self.global_flags |= set;
                if set.contains(FlagSet::VERBOSE) {
                    self.verbose = true;
                }
                self.pop_saved_position();
                Ok(())
            }
            _ => {
                self.next_char(); // consume ':'
                if clearing && clear.is_empty() {
                    return Err(ParseError::UnknownExtension {
                        sequence,
                        location: Location::span(&self.pop_saved_position(), &self.last_position),
                    });
                }
                self.enter_group();
                if set.contains(FlagSet::VERBOSE) {
                    self.verbose = true;
                }
                if clear.contains(FlagSet::VERBOSE) {
                    self.verbose = false;
                }
                output.push(TokenWithRange::new(
                    Token::FlagGroupStart { set, clear },
                    Location::span(&self.pop_saved_position(), &self.last_position),
                ));
                Ok(())
            }
        }
    }
}

fn control_escape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{c}',
        'v' => '\u{b}',
        _ => '\u{7}', // 'a'
    }
}

// the whitespace VERBOSE mode ignores
fn is_pattern_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{b}' | '\u{c}')
}

fn parse_repetition_body(body: &str) -> Option<Repetition> {
    match body.split_once(',') {
        None => {
            let times = body.parse::<usize>().ok()?;
            Some(Repetition::Specified(times))
        }
        Some((from, to)) => {
            if to.contains(',') {
                return None;
            }
            match (from.is_empty(), to.is_empty()) {
                // both bounds may be omitted: `{,}` is `{0,}`
                (true, true) => Some(Repetition::AtLeast(0)),
                (false, true) => Some(Repetition::AtLeast(from.parse().ok()?)),
                (true, false) => Some(Repetition::AtMost(to.parse().ok()?)),
                (false, false) => Some(Repetition::Range(from.parse().ok()?, to.parse().ok()?)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::ParseError;
    use crate::flags::FlagSet;
    use crate::location::Location;
    use crate::token::{Repetition, Token, TokenWithRange};

    use super::lex_from_str;

    fn lex_without_location(pattern: &str) -> Result<Vec<Token>, ParseError> {
        lex_from_str(pattern, FlagSet::empty())
            .map(|(tokens, _)| tokens.into_iter().map(|item| item.token).collect())
    }

    fn lex_verbose(pattern: &str) -> Result<Vec<Token>, ParseError> {
        lex_from_str(pattern, FlagSet::VERBOSE)
            .map(|(tokens, _)| tokens.into_iter().map(|item| item.token).collect())
    }

    #[test]
    fn test_lex_literals() {
        assert_eq!(
            lex_without_location("abc").unwrap(),
            vec![Token::Char('a'), Token::Char('b'), Token::Char('c')]
        );

        // ']' and '}' have no meaning of their own
        assert_eq!(
            lex_without_location("a]}").unwrap(),
            vec![Token::Char('a'), Token::Char(']'), Token::Char('}')]
        );

        assert_eq!(
            lex_without_location("a.b|c").unwrap(),
            vec![
                Token::Char('a'),
                Token::Dot,
                Token::Char('b'),
                Token::LogicOr,
                Token::Char('c')
            ]
        );

        assert_eq!(
            lex_without_location("^ab$").unwrap(),
            vec![
                Token::StartAssertion,
                Token::Char('a'),
                Token::Char('b'),
                Token::EndAssertion
            ]
        );
    }

    #[test]
    fn test_lex_escapes() {
        assert_eq!(
            lex_without_location(r"\t\n\r\f\v\a").unwrap(),
            vec![
                Token::Char('\t'),
                Token::Char('\n'),
                Token::Char('\r'),
                Token::Char('\u{c}'),
                Token::Char('\u{b}'),
                Token::Char('\u{7}'),
            ]
        );

        assert_eq!(
            lex_without_location(r"\.\\\-\ ").unwrap(),
            vec![
                Token::Char('.'),
                Token::Char('\\'),
                Token::Char('-'),
                Token::Char(' '),
            ]
        );

        assert_eq!(
            lex_without_location(r"\x41a").unwrap(),
            vec![Token::Char('A'), Token::Char('a')]
        );

        assert_eq!(
            lex_without_location(r"\d\D\w\W\s\S").unwrap(),
            vec![
                Token::PresetCharSet('d'),
                Token::PresetCharSet('D'),
                Token::PresetCharSet('w'),
                Token::PresetCharSet('W'),
                Token::PresetCharSet('s'),
                Token::PresetCharSet('S'),
            ]
        );

        assert_eq!(
            lex_without_location(r"\A\b\B\Z").unwrap(),
            vec![
                Token::StringStartAssertion,
                Token::BoundaryAssertion('b'),
                Token::BoundaryAssertion('B'),
                Token::StringEndAssertion,
            ]
        );

        assert!(matches!(
            lex_without_location(r"\q"),
            Err(ParseError::InvalidEscape { sequence, .. }) if sequence == "\\q"
        ));
        assert!(matches!(
            lex_without_location(r"\0"),
            Err(ParseError::InvalidEscape { .. })
        ));
        assert!(matches!(
            lex_without_location("a\\"),
            Err(ParseError::InvalidEscape { .. })
        ));
        assert!(matches!(
            lex_without_location(r"\x4g"),
            Err(ParseError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn test_lex_backreferences() {
        assert_eq!(
            lex_without_location(r"(\w),\1").unwrap(),
            vec![
                Token::GroupStart,
                Token::PresetCharSet('w'),
                Token::GroupEnd,
                Token::Char(','),
                Token::BackReferenceNumber(1),
            ]
        );

        // two digits at most; the rest is literal
        assert_eq!(
            lex_without_location(r"\123").unwrap(),
            vec![Token::BackReferenceNumber(12), Token::Char('3')]
        );

        assert_eq!(
            lex_without_location(r"\k<word>").unwrap(),
            vec![Token::BackReferenceIdentifier("word".to_string())]
        );

        assert_eq!(
            lex_without_location(r"(?P=word)").unwrap(),
            vec![Token::BackReferenceIdentifier("word".to_string())]
        );

        assert!(matches!(
            lex_without_location(r"\k9"),
            Err(ParseError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn test_lex_quantifiers() {
        assert_eq!(
            lex_without_location("a*b+c?").unwrap(),
            vec![
                Token::Char('a'),
                Token::ZeroOrMore(false),
                Token::Char('b'),
                Token::OneOrMore(false),
                Token::Char('c'),
                Token::Optional(false),
            ]
        );

        assert_eq!(
            lex_without_location("a*?b+?c??").unwrap(),
            vec![
                Token::Char('a'),
                Token::ZeroOrMore(true),
                Token::Char('b'),
                Token::OneOrMore(true),
                Token::Char('c'),
                Token::Optional(true),
            ]
        );

        assert_eq!(
            lex_without_location("x{3}y{2,}z{,4}w{3,5}").unwrap(),
            vec![
                Token::Char('x'),
                Token::Repetition(Repetition::Specified(3), false),
                Token::Char('y'),
                Token::Repetition(Repetition::AtLeast(2), false),
                Token::Char('z'),
                Token::Repetition(Repetition::AtMost(4), false),
                Token::Char('w'),
                Token::Repetition(Repetition::Range(3, 5), false),
            ]
        );

        assert_eq!(
            lex_without_location("a{3,5}?").unwrap(),
            vec![
                Token::Char('a'),
                Token::Repetition(Repetition::Range(3, 5), true),
            ]
        );

        // both bounds omitted means zero or more
        assert_eq!(
            lex_without_location("a{,}").unwrap(),
            vec![
                Token::Char('a'),
                Token::Repetition(Repetition::AtLeast(0), false),
            ]
        );
        assert_eq!(
            lex_without_location("a{,}?").unwrap(),
            vec![
                Token::Char('a'),
                Token::Repetition(Repetition::AtLeast(0), true),
            ]
        );

        assert!(matches!(
            lex_without_location("a{5,3}"),
            Err(ParseError::InvalidQuantifierRange { .. })
        ));
    }

    #[test]
    fn test_lex_brace_literal_fallback() {
        // braces that do not form a quantifier are plain text
        assert_eq!(
            lex_without_location("{}").unwrap(),
            vec![Token::Char('{'), Token::Char('}')]
        );
        assert_eq!(
            lex_without_location("a{,x}").unwrap(),
            vec![
                Token::Char('a'),
                Token::Char('{'),
                Token::Char(','),
                Token::Char('x'),
                Token::Char('}')
            ]
        );
        assert_eq!(
            lex_without_location("a{x}").unwrap(),
            vec![
                Token::Char('a'),
                Token::Char('{'),
                Token::Char('x'),
                Token::Char('}')
            ]
        );
        assert_eq!(
            lex_without_location("a{1,2,3}").unwrap(),
            vec![
                Token::Char('a'),
                Token::Char('{'),
                Token::Char('1'),
                Token::Char(','),
                Token::Char('2'),
                Token::Char(','),
                Token::Char('3'),
                Token::Char('}')
            ]
        );
    }

    #[test]
    fn test_lex_charset() {
        assert_eq!(
            lex_without_location("[abc]").unwrap(),
            vec![
                Token::ClassStart,
                Token::Char('a'),
                Token::Char('b'),
                Token::Char('c'),
                Token::ClassEnd,
            ]
        );

        assert_eq!(
            lex_without_location(r"[^a-z\d]").unwrap(),
            vec![
                Token::ClassStartNegated,
                Token::CharRange('a', 'z'),
                Token::PresetCharSet('d'),
                Token::ClassEnd,
            ]
        );

        // ']' first is a literal member
        assert_eq!(
            lex_without_location("[]a]").unwrap(),
            vec![
                Token::ClassStart,
                Token::Char(']'),
                Token::Char('a'),
                Token::ClassEnd,
            ]
        );

        // '-' first or last is a literal member
        assert_eq!(
            lex_without_location("[-a]").unwrap(),
            vec![
                Token::ClassStart,
                Token::Char('-'),
                Token::Char('a'),
                Token::ClassEnd,
            ]
        );
        assert_eq!(
            lex_without_location("[a-]").unwrap(),
            vec![
                Token::ClassStart,
                Token::Char('a'),
                Token::Char('-'),
                Token::ClassEnd,
            ]
        );

        // \b inside a class is backspace
        assert_eq!(
            lex_without_location(r"[\b]").unwrap(),
            vec![Token::ClassStart, Token::Char('\u{8}'), Token::ClassEnd]
        );

        assert!(matches!(
            lex_without_location("[abc"),
            Err(ParseError::InvalidCharacterClass { .. })
        ));
        assert!(matches!(
            lex_without_location("[z-a]"),
            Err(ParseError::InvalidCharacterClass { .. })
        ));
        assert!(matches!(
            lex_without_location(r"[a-\d]"),
            Err(ParseError::InvalidCharacterClass { .. })
        ));
        assert!(matches!(
            lex_without_location(r"[\d-z]"),
            Err(ParseError::InvalidCharacterClass { .. })
        ));

        // a '-' after a preset is fine when nothing follows it
        assert_eq!(
            lex_without_location(r"[\d-]").unwrap(),
            vec![
                Token::ClassStart,
                Token::PresetCharSet('d'),
                Token::Char('-'),
                Token::ClassEnd,
            ]
        );
    }

    #[test]
    fn test_lex_groups() {
        assert_eq!(
            lex_without_location("(a)(?:b)").unwrap(),
            vec![
                Token::GroupStart,
                Token::Char('a'),
                Token::GroupEnd,
                Token::NonCapturing,
                Token::Char('b'),
                Token::GroupEnd,
            ]
        );

        assert_eq!(
            lex_without_location("(?=a)(?!b)(?<=c)(?<!d)").unwrap(),
            vec![
                Token::LookAhead,
                Token::Char('a'),
                Token::GroupEnd,
                Token::LookAheadNegative,
                Token::Char('b'),
                Token::GroupEnd,
                Token::LookBehind,
                Token::Char('c'),
                Token::GroupEnd,
                Token::LookBehindNegative,
                Token::Char('d'),
                Token::GroupEnd,
            ]
        );

        assert_eq!(
            lex_without_location("(?P<w1>a)(?<w2>b)").unwrap(),
            vec![
                Token::NamedCapture("w1".to_string()),
                Token::Char('a'),
                Token::GroupEnd,
                Token::NamedCapture("w2".to_string()),
                Token::Char('b'),
                Token::GroupEnd,
            ]
        );

        assert_eq!(
            lex_without_location("(?(1)a|b)").unwrap(),
            vec![
                Token::ConditionalIndex(1),
                Token::Char('a'),
                Token::LogicOr,
                Token::Char('b'),
                Token::GroupEnd,
            ]
        );

        assert_eq!(
            lex_without_location("(?(ch)x)").unwrap(),
            vec![
                Token::ConditionalName("ch".to_string()),
                Token::Char('x'),
                Token::GroupEnd,
            ]
        );

        assert!(matches!(
            lex_without_location("(?q)"),
            Err(ParseError::UnknownExtension { sequence, .. }) if sequence == "?q"
        ));
        assert!(matches!(
            lex_without_location("(?P[)"),
            Err(ParseError::UnknownExtension { .. })
        ));
        assert!(matches!(
            lex_without_location("(?P<>a)"),
            Err(ParseError::InvalidGroupName { .. })
        ));
        assert!(matches!(
            lex_without_location("(?P<9a>b)"),
            Err(ParseError::InvalidGroupName { .. })
        ));
    }

    #[test]
    fn test_lex_comment_group() {
        assert_eq!(
            lex_without_location("a(?#this is a comment)b").unwrap(),
            vec![Token::Char('a'), Token::Char('b')]
        );

        assert!(matches!(
            lex_without_location("a(?#unterminated"),
            Err(ParseError::UnbalancedParenthesis { .. })
        ));
    }

    #[test]
    fn test_lex_inline_flags() {
        // global directives vanish from the token stream and are
        // reported to the caller
        let (tokens, global) = lex_from_str("(?im)bar", FlagSet::empty()).unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.token.clone()).collect::<Vec<_>>(),
            vec![Token::Char('b'), Token::Char('a'), Token::Char('r')]
        );
        assert_eq!(global, FlagSet::CASE_INSENSITIVE | FlagSet::MULTILINE);

        assert_eq!(
            lex_without_location("(?i:a)b").unwrap(),
            vec![
                Token::FlagGroupStart {
                    set: FlagSet::CASE_INSENSITIVE,
                    clear: FlagSet::empty()
                },
                Token::Char('a'),
                Token::GroupEnd,
                Token::Char('b'),
            ]
        );

        assert_eq!(
            lex_without_location("(?i-m:a)").unwrap(),
            vec![
                Token::FlagGroupStart {
                    set: FlagSet::CASE_INSENSITIVE,
                    clear: FlagSet::MULTILINE
                },
                Token::Char('a'),
                Token::GroupEnd,
            ]
        );

        assert_eq!(
            lex_without_location("(?-i:a)").unwrap(),
            vec![
                Token::FlagGroupStart {
                    set: FlagSet::empty(),
                    clear: FlagSet::CASE_INSENSITIVE
                },
                Token::Char('a'),
                Token::GroupEnd,
            ]
        );

        assert!(matches!(
            lex_without_location("(?)"),
            Err(ParseError::UnknownExtension { .. })
        ));
        // clearing needs the scoped form
        assert!(matches!(
            lex_without_location("(?-i)"),
            Err(ParseError::UnknownExtension { .. })
        ));
    }

    #[test]
    fn test_lex_verbose_mode() {
        assert_eq!(
            lex_verbose("a b\tc").unwrap(),
            vec![Token::Char('a'), Token::Char('b'), Token::Char('c')]
        );

        assert_eq!(
            lex_verbose("a # trailing comment\nb").unwrap(),
            vec![Token::Char('a'), Token::Char('b')]
        );

        // an escaped space survives
        assert_eq!(
            lex_verbose(r"a\ b").unwrap(),
            vec![Token::Char('a'), Token::Char(' '), Token::Char('b')]
        );

        // classes keep their whitespace
        assert_eq!(
            lex_verbose("[ ]").unwrap(),
            vec![Token::ClassStart, Token::Char(' '), Token::ClassEnd]
        );

        // a global (?x) turns elision on mid-stream; the caller re-lexes
        // for the part before it
        let (_, global) = lex_from_str("a b(?x)c d", FlagSet::empty()).unwrap();
        assert_eq!(global, FlagSet::VERBOSE);

        // scoped verbosity starts and ends with the group
        assert_eq!(
            lex_without_location("(?x:a b)c d").unwrap(),
            vec![
                Token::FlagGroupStart {
                    set: FlagSet::VERBOSE,
                    clear: FlagSet::empty()
                },
                Token::Char('a'),
                Token::Char('b'),
                Token::GroupEnd,
                Token::Char('c'),
                Token::Char(' '),
                Token::Char('d'),
            ]
        );

        // and the other way around: a verbose pattern with a plain spot
        assert_eq!(
            lex_verbose("(?-x:a b) c").unwrap(),
            vec![
                Token::FlagGroupStart {
                    set: FlagSet::empty(),
                    clear: FlagSet::VERBOSE
                },
                Token::Char('a'),
                Token::Char(' '),
                Token::Char('b'),
                Token::GroupEnd,
                Token::Char('c'),
            ]
        );
    }

    #[test]
    fn test_lex_locations() {
        let (tokens, _) = lex_from_str("a[bc]d{2}", FlagSet::empty()).unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenWithRange::new(Token::Char('a'), Location::new(0, 0, 0, 1)),
                TokenWithRange::new(Token::ClassStart, Location::new(1, 0, 1, 1)),
                TokenWithRange::new(Token::Char('b'), Location::new(2, 0, 2, 1)),
                TokenWithRange::new(Token::Char('c'), Location::new(3, 0, 3, 1)),
                TokenWithRange::new(Token::ClassEnd, Location::new(4, 0, 4, 1)),
                TokenWithRange::new(Token::Char('d'), Location::new(5, 0, 5, 1)),
                TokenWithRange::new(
                    Token::Repetition(Repetition::Specified(2), false),
                    Location::new(6, 0, 6, 3)
                ),
            ]
        );
    }
}
