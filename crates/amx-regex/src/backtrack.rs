//! Backtracking engine
//!
//! Back-references and look-ahead cannot be compiled into an automaton.
//! Patterns that use them run on `fancy-regex` instead, over the same
//! haystacks the automata see: context bytes around a target span.
//!
//! The haystack carries at most one trailing context byte. Each pattern is
//! compiled four ways so a match can be kept from consuming that byte, or
//! pinned to end right before it.

use std::borrow::Cow;
use std::ops::Range;

use fancy_regex::Regex;

use crate::error::{RegexError, RegexResult};
use crate::flags::SyntaxOptions;
use crate::locale::TextMode;

/// Group spans of one match inside a haystack; index 0 is the whole match.
pub(crate) type Spans = Vec<Option<Range<usize>>>;

pub(crate) struct Backtracker {
    mode: TextMode,
    nosubs: bool,
    search: Regex,
    /// Leaves the last haystack byte unconsumed.
    search_tail: Regex,
    /// Ends at the end of the haystack.
    full: Regex,
    /// Ends right before the last haystack byte.
    full_tail: Regex,
}

impl Backtracker {
    /// Compile an already translated pattern.
    pub(crate) fn new(pattern: &str, options: SyntaxOptions, mode: TextMode) -> RegexResult<Self> {
        let icase = if options.contains(SyntaxOptions::ICASE) { "(?i)" } else { "" };
        let build = |suffix: &str| {
            Regex::new(&format!("{icase}(?:{pattern}){suffix}"))
                .map_err(|e| RegexError::Compile(e.to_string()))
        };
        Ok(Self {
            mode,
            nosubs: options.contains(SyntaxOptions::NOSUBS),
            search: build("")?,
            search_tail: build(r"(?=[\s\S])")?,
            full: build(r"\z")?,
            full_tail: build(r"(?=[\s\S]\z)")?,
        })
    }

    /// Number of groups a match records, including group 0.
    pub(crate) fn group_len(&self) -> usize {
        if self.nosubs {
            1
        } else {
            self.search.captures_len()
        }
    }

    /// Leftmost match starting at or after `at` and ending by `end`.
    pub(crate) fn find(&self, hay: &[u8], at: usize, end: usize) -> Option<Spans> {
        let re = if hay.len() > end { &self.search_tail } else { &self.search };
        self.run(re, hay, at)
    }

    /// Match covering exactly `start..end`.
    pub(crate) fn full(&self, hay: &[u8], start: usize, end: usize) -> Option<Spans> {
        let re = if hay.len() > end { &self.full_tail } else { &self.full };
        // Leftmost search: a match anchored at `start` is found first if
        // one exists.
        self.run(re, hay, start)
            .filter(|spans| matches!(spans.first(), Some(Some(m)) if m.start == start))
    }

    fn run(&self, re: &Regex, hay: &[u8], at: usize) -> Option<Spans> {
        let text = Text::new(hay, self.mode)?;
        let pos = text.to_text(at);
        if !text.text.is_char_boundary(pos) {
            return None;
        }
        let caps = match re.captures_from_pos(&text.text, pos) {
            Ok(caps) => caps?,
            Err(error) => {
                tracing::warn!(%error, "backtracking search abandoned");
                return None;
            }
        };
        let groups = if self.nosubs { 1 } else { caps.len() };
        Some(
            (0..groups)
                .map(|i| caps.get(i).map(|m| text.to_byte(m.start())..text.to_byte(m.end())))
                .collect(),
        )
    }
}

/// A haystack as `str`, with positions mapped between the two.
struct Text<'h> {
    text: Cow<'h, str>,
    /// Text offset of every haystack byte plus one past the end; absent
    /// when offsets coincide.
    offsets: Option<Vec<usize>>,
}

impl<'h> Text<'h> {
    /// In byte mode each byte stands for the code point of the same value,
    /// which is what the translated `\xHH` literals match.
    fn new(hay: &'h [u8], mode: TextMode) -> Option<Self> {
        if mode == TextMode::Utf8 || hay.is_ascii() {
            let text = std::str::from_utf8(hay).ok()?;
            return Some(Self {
                text: Cow::Borrowed(text),
                offsets: None,
            });
        }
        let mut text = String::with_capacity(hay.len() * 2);
        let mut offsets = Vec::with_capacity(hay.len() + 1);
        for &b in hay {
            offsets.push(text.len());
            text.push(char::from(b));
        }
        offsets.push(text.len());
        Some(Self {
            text: Cow::Owned(text),
            offsets: Some(offsets),
        })
    }

    fn to_text(&self, byte: usize) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.get(byte).copied().unwrap_or(self.text.len()),
            None => byte,
        }
    }

    fn to_byte(&self, pos: usize) -> usize {
        match &self.offsets {
            Some(offsets) => offsets.binary_search(&pos).unwrap_or_else(|i| i),
            None => pos,
        }
    }
}
