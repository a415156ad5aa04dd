// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The user-facing API: `Regex`, `Match`, `Captures` and the match
//! iterators, plus one-shot convenience functions in the style of the
//! module-level functions of Python's `re`:
//! https://docs.python.org/3/library/re.html#module-contents
//!
//! A `Regex` is a compiled pattern. It holds no per-match state, so a
//! single instance can be shared between threads and reused for any
//! number of searches.

use std::fmt::Display;
use std::ops::{Index, Range};

use crate::compiler::compile_from_str;
use crate::error::{NoSuchGroup, ParseError};
use crate::flags::FlagSet;
use crate::instruction::CompiledProgram;
use crate::matcher::{self, CaptureTable};

#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    program: CompiledProgram,
    step_limit: Option<usize>,
}

impl Regex {
    /// Compiles a pattern with no flags.
    pub fn new(pattern: &str) -> Result<Self, ParseError> {
        Self::with_flags(pattern, FlagSet::empty())
    }

    /// Compiles a pattern with the given flags. Directives such as
    /// `(?i)` inside the pattern are added on top of these.
    pub fn with_flags(pattern: &str, flags: FlagSet) -> Result<Self, ParseError> {
        let program = compile_from_str(pattern, flags)?;
        Ok(Regex {
            pattern: pattern.to_owned(),
            program,
            step_limit: None,
        })
    }

    /// Caps the number of backtracks a single search may spend. A search
    /// that runs out of budget reports "no match" instead of an error.
    /// There is no limit by default.
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = Some(step_limit);
        self
    }

    /// The pattern text this regex was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The number of capture groups, the implicit whole-match group 0
    /// included.
    pub fn captures_len(&self) -> usize {
        self.program.group_count
    }

    pub fn is_match(&self, text: &str) -> bool {
        matcher::search(&self.program, text, 0, self.step_limit).is_some()
    }

    /// The leftmost match, as a plain span without the group table.
    pub fn find<'b>(&self, text: &'b str) -> Option<Match<'b>> {
        let table = matcher::search(&self.program, text, 0, self.step_limit)?;
        let (start, end) = table.span(0)?;
        Some(Match::new(text, start, end))
    }

    /// Iterates over successive non-overlapping matches, left to right.
    /// An empty match is reported once and the scan then advances one
    /// character, so the iteration always terminates.
    pub fn find_iter<'a, 'b>(&'a self, text: &'b str) -> Matches<'a, 'b> {
        Matches::new(self, text)
    }

    /// The leftmost match together with all capture groups.
    pub fn captures<'b>(&self, text: &'b str) -> Option<Captures<'b>> {
        self.search_at(text, 0)
    }

    /// The leftmost match at or after the byte offset `start`, which
    /// must lie on a character boundary. `^` still refers to the real
    /// start of the text, not to `start`.
    pub fn search_at<'b>(&self, text: &'b str, start: usize) -> Option<Captures<'b>> {
        if start > text.len() {
            return None;
        }
        let table = matcher::search(&self.program, text, start, self.step_limit)?;
        Some(self.build_captures(text, &table))
    }

    /// Like `captures`, but anchored: the match must begin at offset 0.
    /// The end is unanchored as usual.
    pub fn match_at_start<'b>(&self, text: &'b str) -> Option<Captures<'b>> {
        let table = matcher::match_at(&self.program, text, 0, self.step_limit)?;
        Some(self.build_captures(text, &table))
    }

    /// Iterates over the capture tables of successive non-overlapping
    /// matches.
    pub fn captures_iter<'a, 'b>(&'a self, text: &'b str) -> CaptureMatches<'a, 'b> {
        CaptureMatches::new(self, text)
    }

    /// Splits the text around every match. The pieces between matches
    /// are returned in order, leading, trailing and adjacent empties
    /// included, and the text of every participating capture group is
    /// inserted after the piece its match follows.
    pub fn split<'b>(&self, text: &'b str) -> Vec<&'b str> {
        let mut parts = Vec::new();
        let mut last_end = 0;

        for captures in self.captures_iter(text) {
            if let Some((start, end)) = captures.span(0) {
                parts.push(&text[last_end..start]);
                for index in 1..captures.len() {
                    if let Some((group_start, group_end)) = captures.span(index) {
                        parts.push(&text[group_start..group_end]);
                    }
                }
                last_end = end;
            }
        }

        parts.push(&text[last_end..]);
        parts
    }

    fn build_captures<'b>(&self, text: &'b str, table: &CaptureTable) -> Captures<'b> {
        let spans = (0..table.group_count())
            .map(|index| table.span(index))
            .collect();
        Captures {
            text,
            spans,
            names: self.program.group_names.clone(),
        }
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

// the following functions compile and run a pattern in one step, like
// `re.search`, `re.match`, `re.split` and `re.escape` in Python.

pub fn compile(pattern: &str, flags: FlagSet) -> Result<Regex, ParseError> {
    Regex::with_flags(pattern, flags)
}

pub fn search<'b>(pattern: &str, text: &'b str) -> Result<Option<Captures<'b>>, ParseError> {
    let regex = Regex::new(pattern)?;
    Ok(regex.captures(text))
}

pub fn match_at_start<'b>(
    pattern: &str,
    text: &'b str,
) -> Result<Option<Captures<'b>>, ParseError> {
    let regex = Regex::new(pattern)?;
    Ok(regex.match_at_start(text))
}

pub fn split<'b>(pattern: &str, text: &'b str) -> Result<Vec<&'b str>, ParseError> {
    let regex = Regex::new(pattern)?;
    Ok(regex.split(text))
}

// the characters `re.escape` rewrites, the pattern whitespace ones
// included so that the result survives VERBOSE mode
const ESCAPED_CHARS: &str = "()[]{}?*+-|^$\\.&~# \t\n\r\x0b\x0c";

/// Backslash-escapes every metacharacter so the result matches the
/// input text literally.
pub fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if ESCAPED_CHARS.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Iterator yielded by `Regex::find_iter`.
pub struct Matches<'a, 'b> {
    regex: &'a Regex,
    text: &'b str,
    last_position: usize,
}

impl<'a, 'b> Matches<'a, 'b> {
    fn new(regex: &'a Regex, text: &'b str) -> Self {
        Matches {
            regex,
            text,
            last_position: 0,
        }
    }
}

impl<'a, 'b> Iterator for Matches<'a, 'b> {
    type Item = Match<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.last_position > self.text.len() {
            return None;
        }
        let table = matcher::search(
            &self.regex.program,
            self.text,
            self.last_position,
            self.regex.step_limit,
        )?;
        let (start, end) = table.span(0)?;

        // an empty match must not be found again at the same position
        self.last_position = if start == end {
            position_after(self.text, end)
        } else {
            end
        };

        Some(Match::new(self.text, start, end))
    }
}

/// Iterator yielded by `Regex::captures_iter`.
pub struct CaptureMatches<'a, 'b> {
    regex: &'a Regex,
    text: &'b str,
    last_position: usize,
}

impl<'a, 'b> CaptureMatches<'a, 'b> {
    fn new(regex: &'a Regex, text: &'b str) -> Self {
        CaptureMatches {
            regex,
            text,
            last_position: 0,
        }
    }
}

impl<'a, 'b> Iterator for CaptureMatches<'a, 'b> {
    type Item = Captures<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.last_position > self.text.len() {
            return None;
        }
        let table = matcher::search(
            &self.regex.program,
            self.text,
            self.last_position,
            self.regex.step_limit,
        )?;
        let (start, end) = table.span(0)?;

        self.last_position = if start == end {
            position_after(self.text, end)
        } else {
            end
        };

        Some(self.regex.build_captures(self.text, &table))
    }
}

// one character forward, or past the end when already there
fn position_after(text: &str, position: usize) -> usize {
    match text[position..].chars().next() {
        Some(c) => position + c.len_utf8(),
        None => position + 1,
    }
}

/// The capture groups of one match. Group 0 is the whole match; a group
/// that took no part in the match reads back as `None`, which is
/// different from asking for a group the pattern does not have at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures<'a> {
    text: &'a str,
    spans: Vec<Option<(usize, usize)>>,
    names: Vec<(String, usize)>,
}

impl<'a> Captures<'a> {
    // the accessors below follow the 'Captures' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Captures.html

    /// The match of the group at `index`. `None` when there is no such
    /// group or it did not participate.
    pub fn get(&self, index: usize) -> Option<Match<'a>> {
        let (start, end) = self.spans.get(index).copied().flatten()?;
        Some(Match::new(self.text, start, end))
    }

    /// The match of the named group. `None` when there is no such name
    /// or the group did not participate.
    pub fn name(&self, name: &str) -> Option<Match<'a>> {
        let (_, index) = self.names.iter().find(|(group_name, _)| group_name == name)?;
        self.get(*index)
    }

    // e.g.
    //
    // ```
    //   let caps = re.captures("2024-06-15").unwrap();
    //   let (whole, [year, month, day]) = caps.extract();
    // ```
    //
    // a group that did not participate reads back as "".
    pub fn extract<const N: usize>(&self) -> (&'a str, [&'a str; N]) {
        let mut items: [&'a str; N] = [""; N];
        for (index, item) in items.iter_mut().enumerate() {
            if let Some((start, end)) = self.spans[index + 1] {
                *item = &self.text[start..end];
            }
        }
        let whole = match self.spans[0] {
            Some((start, end)) => &self.text[start..end],
            None => "",
        };
        (whole, items)
    }

    /// The text of the group at `index`, `Ok(None)` when the group
    /// exists but did not participate. An index the pattern does not
    /// have is a caller error, not a quiet `None`.
    pub fn group(&self, index: usize) -> Result<Option<&'a str>, NoSuchGroup> {
        match self.spans.get(index).copied() {
            Some(span) => Ok(span.map(|(start, end)| &self.text[start..end])),
            None => Err(NoSuchGroup::Index(index)),
        }
    }

    /// The text of the named group, with the same contract as `group`.
    pub fn group_named(&self, name: &str) -> Result<Option<&'a str>, NoSuchGroup> {
        match self.names.iter().find(|(group_name, _)| group_name == name) {
            Some((_, index)) => self.group(*index),
            None => Err(NoSuchGroup::Name(name.to_owned())),
        }
    }

    /// The texts of groups 1 and up in index order, with `None` for
    /// each group that did not participate.
    pub fn groups(&self) -> Vec<Option<&'a str>> {
        self.spans[1..]
            .iter()
            .copied()
            .map(|span| span.map(|(start, end)| &self.text[start..end]))
            .collect()
    }

    /// The byte span of the group at `index`, `None` when absent or
    /// non-participating.
    pub fn span(&self, index: usize) -> Option<(usize, usize)> {
        self.spans.get(index).copied().flatten()
    }

    /// The number of groups, participating or not, group 0 included.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl Index<usize> for Captures<'_> {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| {
                panic!(
                    "Capture group {} does not exist or did not participate in the match.",
                    index
                )
            })
            .as_str()
    }
}

impl Index<&str> for Captures<'_> {
    type Output = str;

    fn index(&self, name: &str) -> &Self::Output {
        self.name(name)
            .unwrap_or_else(|| panic!("Cannot find a matched capture group named \"{}\".", name))
            .as_str()
    }
}

/// A single match: a span of the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    text: &'a str,
    start: usize, // the position of the utf-8 byte stream (value included)
    end: usize,   // the position of the utf-8 byte stream (value excluded)
}

impl<'a> Match<'a> {
    fn new(text: &'a str, start: usize, end: usize) -> Self {
        Match { text, start, end }
    }

    // the following methods are intended to be compatible with the
    // 'Match' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Match.html

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        Range {
            start: self.start,
            end: self.end,
        }
    }

    pub fn as_str(&self) -> &'a str {
        &self.text[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{compile, escape, match_at_start, search, split, Regex};
    use crate::error::{NoSuchGroup, ParseError};
    use crate::flags::FlagSet;

    #[test]
    fn test_find_leftmost_match() {
        let regex = Regex::new("foo|graull").unwrap();
        let found = regex.find("foograull").unwrap();
        assert_eq!((found.start(), found.end()), (0, 3));
        assert_eq!(found.as_str(), "foo");

        // an earlier start beats a longer match further right
        let regex = Regex::new("aa|b").unwrap();
        assert_eq!(regex.find("xbaa").unwrap().as_str(), "b");
    }

    #[test]
    fn test_greedy_and_lazy_repetition() {
        let text = "%<foo> <bar> <baz>%";

        let greedy = Regex::new("<.*>").unwrap();
        assert_eq!(greedy.find(text).unwrap().as_str(), "<foo> <bar> <baz>");

        let lazy = Regex::new("<.*?>").unwrap();
        assert_eq!(lazy.find(text).unwrap().as_str(), "<foo>");

        // `{,}` repeats zero or more times, so it matches empty text
        let regex = Regex::new("a{,}").unwrap();
        assert!(regex.is_match("bbb"));
        assert_eq!(regex.find("bbb").unwrap().range(), 0..0);
        assert_eq!(regex.find("baa").unwrap().range(), 0..0);
    }

    #[test]
    fn test_capture_rollback_across_iterations() {
        // the second iteration of group 1 must not leave a stale group 2
        // from the first one
        let regex = Regex::new(r"(foo(bar)?)+(\d\d\d)?").unwrap();
        let captures = regex.captures("foofoobar123").unwrap();

        assert_eq!(captures.group(0), Ok(Some("foofoobar123")));
        assert_eq!(captures.group(1), Ok(Some("foobar")));
        assert_eq!(captures.group(2), Ok(Some("bar")));
        assert_eq!(captures.group(3), Ok(Some("123")));
    }

    #[test]
    fn test_backreferences() {
        let regex = Regex::new(r"(\w+),\1").unwrap();
        assert!(regex.is_match("foo,foo"));
        assert!(!regex.is_match("foo,quz"));

        let regex = Regex::new(r"(?P<word>\w+),(?P=word)").unwrap();
        let captures = regex.captures("foo,foo").unwrap();
        assert_eq!(captures.span(0), Some((0, 7)));
        assert_eq!(captures.name("word").unwrap().as_str(), "foo");
    }

    #[test]
    fn test_scoped_ignorecase_group() {
        let regex = Regex::new("(?i:foo)bar").unwrap();
        assert!(regex.is_match("FOObar"));
        assert!(regex.is_match("foobar"));
        assert!(!regex.is_match("FOOBAR"));
        assert!(!regex.is_match("fooBAR"));
    }

    #[test]
    fn test_global_inline_flags() {
        let regex = Regex::new("(?im)^bar").unwrap();
        let found = regex.find("Foo\nBAR").unwrap();
        assert_eq!((found.start(), found.end()), (4, 7));

        // a directive is global wherever it appears
        let regex = Regex::new("bar(?i)").unwrap();
        assert!(regex.is_match("BAR"));
    }

    #[test]
    fn test_anchors_and_multiline() {
        assert!(Regex::new("^bar").unwrap().find("foo\nbar").is_none());

        let multiline = Regex::with_flags("^bar", FlagSet::MULTILINE).unwrap();
        assert_eq!(multiline.find("foo\nbar").unwrap().range(), 4..7);

        // `$` tolerates one trailing newline, `\Z` does not
        let dollar = Regex::new("foo$").unwrap();
        assert_eq!(dollar.find("foo\n").unwrap().range(), 0..3);

        let text_end = Regex::new(r"foo\Z").unwrap();
        assert!(text_end.find("foo\n").is_none());
        assert!(text_end.find("foo").is_some());

        // an anchored pattern is attempted at the start only
        let anchored = Regex::new("^a").unwrap();
        let starts: Vec<usize> = anchored.find_iter("aaa").map(|m| m.start()).collect();
        assert_eq!(starts, vec![0]);
    }

    #[test]
    fn test_escape_round_trip() {
        let soup = r"1+1=2 (really?) [50%] {braces} #tag ~&|^$\.";
        let regex = Regex::new(&escape(soup)).unwrap();
        assert_eq!(regex.find(soup).unwrap().range(), 0..soup.len());

        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a-b"), r"a\-b");
    }

    #[test]
    fn test_fixed_length_lookbehind() {
        let error = Regex::new("(?<=a+)foo").unwrap_err();
        assert!(matches!(
            error,
            ParseError::VariableLengthLookbehind { .. }
        ));

        let regex = Regex::new("(?<=a{3})foo").unwrap();
        assert_eq!(regex.find("aaafoo").unwrap().range(), 3..6);
        assert!(regex.find("aafoo").is_none());
    }

    #[test]
    fn test_conditional_on_group() {
        let regex = Regex::new("^(###)?foo(?(1)bar|baz)").unwrap();
        assert_eq!(regex.find("###foobar").unwrap().range(), 0..9);
        assert_eq!(regex.find("foobaz").unwrap().range(), 0..6);
        assert!(regex.find("###foobaz").is_none());

        // unanchored, the engine may retry past the unmatched prefix
        let regex = Regex::new("(#)?foo(?(1)bar|baz)").unwrap();
        let captures = regex.captures("#foobaz").unwrap();
        assert_eq!(captures.span(0), Some((1, 7)));
        assert_eq!(captures.group(1), Ok(None));

        // named reference with an empty no-branch
        let regex = Regex::new(r"^(?P<ch>\W)?foo(?(ch)(?P=ch)|)$").unwrap();
        assert!(regex.is_match("#foo#"));
        assert!(regex.is_match("foo"));
        assert!(!regex.is_match("#foo"));
    }

    #[test]
    fn test_verbose_pattern() {
        let pattern = r"
            \d{3}    # area code
            [-\s]?   # separator
            \d{4}
        ";
        let regex = Regex::with_flags(pattern, FlagSet::VERBOSE).unwrap();
        assert_eq!(regex.find("call 555 0199").unwrap().as_str(), "555 0199");
    }

    #[test]
    fn test_split() {
        let regex = Regex::new(r"\W+").unwrap();
        assert_eq!(
            regex.split("Words, words, words."),
            vec!["Words", "words", "words", ""]
        );

        // participating capture groups are kept between the pieces
        let regex = Regex::new(r"(\W+)").unwrap();
        assert_eq!(
            regex.split("Words, words, words."),
            vec!["Words", ", ", "words", ", ", "words", ".", ""]
        );

        // empty matches split between characters
        let regex = Regex::new("x*").unwrap();
        assert_eq!(regex.split("axbc"), vec!["", "a", "", "b", "c", ""]);
    }

    #[test]
    fn test_find_iter() {
        let regex = Regex::new(r"\d+").unwrap();
        let numbers: Vec<&str> = regex
            .find_iter("1 once 22 twice 333 thrice")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(numbers, vec!["1", "22", "333"]);
    }

    #[test]
    fn test_find_iter_with_empty_matches() {
        let regex = Regex::new("a*").unwrap();
        let spans: Vec<(usize, usize)> = regex
            .find_iter("baa")
            .map(|m| (m.start(), m.end()))
            .collect();
        assert_eq!(spans, vec![(0, 0), (1, 3), (3, 3)]);

        // advancing over a multibyte character after an empty match
        let regex = Regex::new("x*").unwrap();
        let spans: Vec<(usize, usize)> = regex
            .find_iter("é")
            .map(|m| (m.start(), m.end()))
            .collect();
        assert_eq!(spans, vec![(0, 0), (2, 2)]);
    }

    #[test]
    fn test_captures_iter() {
        let regex = Regex::new(r"(\w)(\d)").unwrap();
        let spans: Vec<Option<(usize, usize)>> = regex
            .captures_iter("a1 b2 c3")
            .map(|captures| captures.span(2))
            .collect();
        assert_eq!(spans, vec![Some((1, 2)), Some((4, 5)), Some((7, 8))]);
    }

    #[test]
    fn test_match_at_start() {
        let regex = Regex::new("o+").unwrap();

        let captures = regex.match_at_start("oof").unwrap();
        assert_eq!(captures.span(0), Some((0, 2)));

        assert!(regex.match_at_start("foo").is_none());
        assert_eq!(regex.find("foo").unwrap().range(), 1..3);
    }

    #[test]
    fn test_search_at() {
        let regex = Regex::new("a").unwrap();
        assert_eq!(regex.search_at("aba", 1).unwrap().span(0), Some((2, 3)));
        assert!(regex.search_at("aba", 3).is_none());
        assert!(regex.search_at("aba", 9).is_none());
    }

    #[test]
    fn test_word_boundaries() {
        let regex = Regex::new(r"\bfoo\b").unwrap();
        assert_eq!(regex.find("catfood foo bar").unwrap().range(), 8..11);

        let regex = Regex::new(r"py\B").unwrap();
        assert!(regex.is_match("python"));
        assert!(!regex.is_match("py"));
    }

    #[test]
    fn test_dotall_flag() {
        assert!(!Regex::new("a.b").unwrap().is_match("a\nb"));
        assert!(Regex::with_flags("a.b", FlagSet::DOTALL)
            .unwrap()
            .is_match("a\nb"));
    }

    #[test]
    fn test_capture_group_errors() {
        let regex = Regex::new("(a)|(b)").unwrap();
        assert_eq!(regex.captures_len(), 3);

        let captures = regex.captures("a").unwrap();
        assert_eq!(captures.len(), 3);
        assert_eq!(captures.group(1), Ok(Some("a")));

        // group 2 exists but sat out of the match
        assert_eq!(captures.group(2), Ok(None));
        assert_eq!(captures.get(2), None);

        // group 5 does not exist at all
        assert_eq!(captures.group(5), Err(NoSuchGroup::Index(5)));
        assert_eq!(
            captures.group_named("missing"),
            Err(NoSuchGroup::Name("missing".to_owned()))
        );
    }

    #[test]
    fn test_step_limit_gives_up() {
        // exponential backtracking stops once the budget is spent
        let regex = Regex::new("(a+)+$").unwrap().with_step_limit(10_000);
        assert!(!regex.is_match("aaaaaaaaaaaaaaaaaaaaaaaaab"));

        // the same pattern still works on cooperative input
        let regex = Regex::new("(a+)+$").unwrap();
        assert!(regex.is_match("aaaa"));

        // a budget large enough does not get in the way
        let regex = Regex::new("a+b").unwrap().with_step_limit(10_000);
        assert!(regex.is_match("aaab"));
    }

    #[test]
    fn test_ignorecase_folding() {
        let regex = Regex::new("(?i)ärger").unwrap();
        assert!(regex.is_match("ÄRGER"));

        let regex = Regex::new("(?i)[a-z]+").unwrap();
        assert_eq!(regex.find("MiXeD").unwrap().as_str(), "MiXeD");

        // ASCII folding leaves non-ASCII letters alone
        let regex = Regex::new("(?ai)ä").unwrap();
        assert!(regex.is_match("ä"));
        assert!(!regex.is_match("Ä"));

        let regex = Regex::new("(?ai)a").unwrap();
        assert!(regex.is_match("A"));
    }

    #[test]
    fn test_named_group_access() {
        let regex = Regex::new(r"(?P<year>\d{4})-(?P<month>\d{2})").unwrap();
        let captures = regex.captures("date: 2026-08-25").unwrap();

        assert_eq!(captures.name("year").unwrap().as_str(), "2026");
        assert_eq!(captures.group_named("month"), Ok(Some("08")));
        assert_eq!(captures.span(2), Some((11, 13)));
        assert_eq!(&captures["year"], "2026");
        assert_eq!(&captures[0], "2026-08");
    }

    #[test]
    fn test_groups_and_extract() {
        let regex = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
        let captures = regex.captures("due on 2024-06-15 at noon").unwrap();

        let (whole, [year, month, day]) = captures.extract();
        assert_eq!(whole, "2024-06-15");
        assert_eq!([year, month, day], ["2024", "06", "15"]);

        // a skipped optional group is None in groups(), "" in extract()
        let regex = Regex::new("(a)(b)?").unwrap();
        let captures = regex.captures("a").unwrap();
        assert_eq!(captures.groups(), vec![Some("a"), None]);
        assert_eq!(captures.extract(), ("a", ["a", ""]));
    }

    #[test]
    fn test_pattern_text_accessors() {
        let regex = Regex::new("a+").unwrap();
        assert_eq!(regex.as_str(), "a+");
        assert_eq!(regex.to_string(), "a+");
        assert_eq!(regex.captures_len(), 1);
    }

    #[test]
    fn test_module_level_functions() {
        let captures = search(r"\d+", "abc123xyz").unwrap().unwrap();
        assert_eq!(captures.span(0), Some((3, 6)));

        assert!(match_at_start("a", "ba").unwrap().is_none());
        assert!(match_at_start("b", "ba").unwrap().is_some());

        assert_eq!(split("-", "a-b-c").unwrap(), vec!["a", "b", "c"]);

        let regex = compile("a", FlagSet::CASE_INSENSITIVE).unwrap();
        assert!(regex.is_match("A"));

        assert!(search("[", "x").is_err());
    }

    #[test]
    fn test_regex_is_shareable() {
        fn assert_send_and_sync<T: Send + Sync>(_value: &T) {}

        let regex = Regex::new("a").unwrap();
        assert_send_and_sync(&regex);
    }
}
