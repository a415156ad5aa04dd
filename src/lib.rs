// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

mod ast;
mod charwithposition;
mod compiler;
mod error;
mod flags;
mod instruction;
mod lexer;
mod location;
mod matcher;
mod parser;
mod peekableiter;
mod regex;
mod rulechecker;
mod token;

pub use error::{NoSuchGroup, ParseError};
pub use flags::FlagSet;
pub use location::Location;
pub use regex::{
    compile, escape, match_at_start, search, split, CaptureMatches, Captures, Match, Matches,
    Regex,
};
