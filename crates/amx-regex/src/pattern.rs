//! Compiled patterns and match results
//!
//! A [`CompiledPattern`] wraps the engine objects built from one pattern
//! string. It is immutable once built; every operation takes `&self` and
//! may run concurrently. Patterns compile to `regex-automata` unless they
//! use back-references or look-ahead, which go to the backtracker.
//!
//! Match flags that talk about the edges of the target (`NOT_BOL`,
//! `NOT_BOW`, `PREV_AVAIL` and friends) are expressed as haystack context:
//! the target is searched inside a slightly larger buffer whose extra
//! bytes make the engine's own assertions answer the way the flags ask.

use regex_automata::meta::{self, Regex};
use regex_automata::nfa::thompson::WhichCaptures;
use regex_automata::util::captures::Captures;
use regex_automata::{Anchored, Input, MatchKind, PatternID, Span};
use regex_syntax::hir::{Hir, Look};
use regex_syntax::ParserBuilder;

use crate::backtrack::{Backtracker, Spans};
use crate::error::{RegexError, RegexResult};
use crate::flags::{Grammar, MatchFlags, SyntaxOptions};
use crate::format::{self, MatchContext};
use crate::grammar;
use crate::locale::{Locale, TextMode};

/// Context byte that is a word character in every text mode.
const WORD: u8 = b'a';

/// Context byte that is neither a word character nor a line terminator.
/// Inbound strings never contain it.
const NON_WORD: u8 = 0;

// ============================================================================
// Match results
// ============================================================================

/// Captured group texts of one successful match.
///
/// Index 0 is the whole match; unmatched optional groups are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    groups: Vec<Vec<u8>>,
}

impl MatchResult {
    /// Build from group texts, whole match first.
    pub fn new(groups: Vec<Vec<u8>>) -> Self {
        Self { groups }
    }

    fn from_spans(hay: &[u8], spans: &Spans) -> Self {
        let groups = spans
            .iter()
            .map(|span| span.clone().map_or_else(Vec::new, |r| hay[r].to_vec()))
            .collect();
        Self { groups }
    }

    /// Text of group `index`, if the match recorded that many groups.
    pub fn group(&self, index: usize) -> Option<&[u8]> {
        self.groups.get(index).map(Vec::as_slice)
    }

    /// Number of recorded groups, including group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no groups were recorded.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ============================================================================
// Engines
// ============================================================================

struct Automata {
    /// Leftmost-first searcher; the engine's answer for search and replace.
    searcher: Regex,
    /// Longest-match searcher, used to decide whether a full match exists.
    longest: Regex,
    /// Pattern followed by an end-of-text assertion, used to pick the
    /// captures of a full match. Absent under `NOSUBS`.
    exact: Option<Regex>,
}

impl Automata {
    fn new(pattern: &str, options: SyntaxOptions, mode: TextMode) -> RegexResult<Self> {
        let utf8 = mode == TextMode::Utf8;
        let hir = ParserBuilder::new()
            .unicode(utf8)
            .utf8(utf8)
            .case_insensitive(options.contains(SyntaxOptions::ICASE))
            .build()
            .parse(pattern)
            .map_err(|e| RegexError::Compile(e.to_string()))?;

        let captures = if options.contains(SyntaxOptions::NOSUBS) {
            WhichCaptures::Implicit
        } else {
            WhichCaptures::All
        };
        let config = meta::Config::new()
            .utf8_empty(utf8)
            .dfa(options.contains(SyntaxOptions::OPTIMIZE))
            .which_captures(captures);

        let searcher = build(&hir, config.clone().match_kind(MatchKind::LeftmostFirst))?;
        let longest = build(
            &hir,
            config
                .clone()
                .match_kind(MatchKind::All)
                .which_captures(WhichCaptures::Implicit),
        )?;
        let exact = if options.contains(SyntaxOptions::NOSUBS) {
            None
        } else {
            let anchored = Hir::concat(vec![hir, Hir::look(Look::End)]);
            Some(build(&anchored, config.match_kind(MatchKind::LeftmostFirst))?)
        };
        Ok(Self {
            searcher,
            longest,
            exact,
        })
    }
}

enum Engine {
    Automata(Automata),
    Backtrack(Backtracker),
}

// ============================================================================
// Compiled pattern
// ============================================================================

/// A pattern compiled under a fixed grammar, option set and locale.
pub struct CompiledPattern {
    source: Vec<u8>,
    grammar: Grammar,
    options: SyntaxOptions,
    locale: Locale,
    engine: Engine,
}

impl std::fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("source", &String::from_utf8_lossy(&self.source))
            .field("grammar", &self.grammar)
            .field("options", &self.options)
            .field("locale", &self.locale.name())
            .field("backtracking", &matches!(self.engine, Engine::Backtrack(_)))
            .finish()
    }
}

impl CompiledPattern {
    /// Compile `source` in `grammar` with `options` under `locale`.
    pub fn new(
        source: &[u8],
        grammar: Grammar,
        options: SyntaxOptions,
        locale: &Locale,
    ) -> RegexResult<Self> {
        let translated = grammar::translate(source, grammar, locale.mode())?;
        let engine = if translated.backtrack {
            Engine::Backtrack(Backtracker::new(&translated.pattern, options, locale.mode())?)
        } else {
            Engine::Automata(Automata::new(&translated.pattern, options, locale.mode())?)
        };
        Ok(Self {
            source: source.to_vec(),
            grammar,
            options,
            locale: locale.clone(),
            engine,
        })
    }

    /// Number of groups a match records, including group 0.
    pub fn group_len(&self) -> usize {
        match &self.engine {
            Engine::Automata(a) => a.searcher.group_info().group_len(PatternID::ZERO),
            Engine::Backtrack(bt) => bt.group_len(),
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Whether the whole of `subject` matches.
    pub fn is_full_match(&self, subject: &[u8], flags: MatchFlags) -> bool {
        let Engine::Automata(a) = &self.engine else {
            return self.full_match(subject, flags).is_some();
        };
        let (hay, span) = self.haystack(subject, 0, flags, true);
        let input = Input::new(&hay).span(span).anchored(Anchored::Yes);
        a.longest.search(&input).is_some_and(|m| {
            m.end() == span.end && !(m.is_empty() && flags.contains(MatchFlags::NOT_NULL))
        })
    }

    /// Match the whole of `subject`, recording its groups.
    pub fn full_match(&self, subject: &[u8], flags: MatchFlags) -> Option<MatchResult> {
        let a = match &self.engine {
            Engine::Automata(a) => a,
            Engine::Backtrack(bt) => {
                if subject.is_empty() && flags.contains(MatchFlags::NOT_NULL) {
                    return None;
                }
                let (hay, span) = self.haystack(subject, 0, flags, true);
                let spans = bt.full(&hay, span.start, span.end)?;
                return Some(MatchResult::from_spans(&hay, &spans));
            }
        };
        if !self.is_full_match(subject, flags) {
            return None;
        }
        let whole = || {
            let mut groups = vec![Vec::new(); self.group_len().max(1)];
            groups[0] = subject.to_vec();
            MatchResult::new(groups)
        };
        let Some(exact) = &a.exact else {
            return Some(whole());
        };

        // No trailing context here: the end assertion must hold at the end
        // of the subject.
        let (hay, span) = self.haystack(subject, 0, flags, false);
        let input = Input::new(&hay).span(span).anchored(Anchored::Yes);
        let mut caps = exact.create_captures();
        exact.search_captures(&input, &mut caps);
        Some(if caps.is_match() {
            MatchResult::from_spans(&hay, &spans_of(&caps))
        } else {
            whole()
        })
    }

    /// First match in `subject[start..]`. The returned position is relative
    /// to `start`.
    pub fn search(
        &self,
        subject: &[u8],
        start: usize,
        flags: MatchFlags,
    ) -> RegexResult<Option<(MatchResult, usize)>> {
        if start > subject.len() {
            return Err(RegexError::InvalidArgument(format!(
                "start offset {} is past the end of a {}-byte subject",
                start,
                subject.len()
            )));
        }
        let (hay, span) = self.haystack(subject, start, flags, true);
        let found = self.next_match(&hay, span, span.start, anchoring(flags), flags);
        Ok(found.and_then(|spans| {
            let m = spans.first().cloned().flatten()?;
            Some((MatchResult::from_spans(&hay, &spans), m.start - span.start))
        }))
    }

    /// Substitute matches of this pattern in `subject` using `template`.
    pub fn replace(&self, subject: &[u8], template: &[u8], flags: MatchFlags) -> Vec<u8> {
        let (hay, span) = self.haystack(subject, 0, flags, true);
        let sed = flags.contains(MatchFlags::FORMAT_SED);
        let copy = !flags.contains(MatchFlags::FORMAT_NO_COPY);
        let anchored = anchoring(flags);

        let mut out = Vec::with_capacity(subject.len());
        let mut last = span.start;
        let mut at = span.start;
        let mut prev_empty = false;
        loop {
            let spans = if prev_empty {
                if at >= span.end {
                    break;
                }
                // A non-empty match at the same spot wins over moving on.
                self.next_match(&hay, span, at, Anchored::Yes, flags | MatchFlags::NOT_NULL)
                    .or_else(|| {
                        let next = self.locale.next_boundary(&hay, at).min(span.end);
                        self.next_match(&hay, span, next, anchored, flags)
                    })
            } else {
                self.next_match(&hay, span, at, anchored, flags)
            };
            let Some(spans) = spans else {
                break;
            };
            let Some(m) = spans.first().cloned().flatten() else {
                break;
            };

            if copy {
                out.extend_from_slice(&hay[last..m.start]);
            }
            let groups: Vec<&[u8]> = spans
                .iter()
                .map(|group| group.clone().map_or(&[][..], |r| &hay[r]))
                .collect();
            let ctx = MatchContext {
                groups: &groups,
                prefix: &hay[last..m.start],
                suffix: &hay[m.end..span.end],
            };
            format::expand(template, sed, &ctx, &mut out);

            last = m.end;
            at = m.end;
            prev_empty = m.is_empty();
            if flags.contains(MatchFlags::FORMAT_FIRST_ONLY) {
                break;
            }
        }
        if copy {
            out.extend_from_slice(&hay[last..span.end]);
        }
        out
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Leftmost match starting at or after `at`, skipping empty matches
    /// when `NOT_NULL` is set.
    fn next_match(
        &self,
        hay: &[u8],
        span: Span,
        mut at: usize,
        anchored: Anchored,
        flags: MatchFlags,
    ) -> Option<Spans> {
        loop {
            let spans = self.find_at(hay, span, at, anchored)?;
            let m = spans.first().cloned().flatten()?;
            if !(m.is_empty() && flags.contains(MatchFlags::NOT_NULL)) {
                return Some(spans);
            }
            if anchored.is_anchored() || m.start >= span.end {
                return None;
            }
            at = self.locale.next_boundary(hay, m.start).min(span.end);
        }
    }

    fn find_at(&self, hay: &[u8], span: Span, at: usize, anchored: Anchored) -> Option<Spans> {
        match &self.engine {
            Engine::Automata(a) => {
                let input = Input::new(hay).range(at..span.end).anchored(anchored);
                let mut caps = a.searcher.create_captures();
                a.searcher.search_captures(&input, &mut caps);
                caps.is_match().then(|| spans_of(&caps))
            }
            Engine::Backtrack(bt) => {
                let spans = bt.find(hay, at, span.end)?;
                let start = spans.first().cloned().flatten()?.start;
                (!anchored.is_anchored() || start == at).then_some(spans)
            }
        }
    }

    /// Buffer holding `subject[start..]` plus the context bytes `flags`
    /// call for, and the span of the target inside it.
    ///
    /// A word byte placed for `NOT_BOW`/`NOT_EOW` also keeps `^`/`$` from
    /// matching at that edge. At a non-word edge `\b` cannot match anyway,
    /// so nothing is placed.
    fn haystack(
        &self,
        subject: &[u8],
        start: usize,
        flags: MatchFlags,
        trailing: bool,
    ) -> (Vec<u8>, Span) {
        let target = &subject[start..];
        let mut hay = Vec::with_capacity(subject.len() + 2);

        if start > 0 && flags.contains(MatchFlags::PREV_AVAIL) {
            hay.extend_from_slice(&subject[..start]);
        } else if flags.contains(MatchFlags::NOT_BOW) && self.locale.is_word_start(target) {
            hay.push(WORD);
        } else if flags.contains(MatchFlags::NOT_BOL) {
            hay.push(NON_WORD);
        }

        let begin = hay.len();
        hay.extend_from_slice(target);
        let end = hay.len();

        if trailing {
            if flags.contains(MatchFlags::NOT_EOW) && self.locale.is_word_end(target) {
                hay.push(WORD);
            } else if flags.contains(MatchFlags::NOT_EOL) {
                hay.push(NON_WORD);
            }
        }
        (hay, Span { start: begin, end })
    }
}

fn spans_of(caps: &Captures) -> Spans {
    (0..caps.group_len())
        .map(|i| caps.get_group(i).map(|s| s.range()))
        .collect()
}

fn anchoring(flags: MatchFlags) -> Anchored {
    if flags.contains(MatchFlags::CONTINUOUS) {
        Anchored::Yes
    } else {
        Anchored::No
    }
}

fn build(hir: &Hir, config: meta::Config) -> RegexResult<Regex> {
    meta::Builder::new()
        .configure(config)
        .build_from_hir(hir)
        .map_err(|e| RegexError::Compile(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> CompiledPattern {
        CompiledPattern::new(
            pattern.as_bytes(),
            Grammar::EcmaScript,
            SyntaxOptions::empty(),
            &Locale::default(),
        )
        .unwrap()
    }

    fn groups(result: &MatchResult) -> Vec<&str> {
        (0..result.len())
            .map(|i| std::str::from_utf8(result.group(i).unwrap()).unwrap())
            .collect()
    }

    fn replace(pattern: &str, subject: &str, template: &str, flags: MatchFlags) -> String {
        let out = compile(pattern).replace(subject.as_bytes(), template.as_bytes(), flags);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_compile_error_carries_diagnostic() {
        let err = CompiledPattern::new(
            b"a(b",
            Grammar::EcmaScript,
            SyntaxOptions::empty(),
            &Locale::default(),
        )
        .unwrap_err();
        match err {
            RegexError::Compile(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_full_match() {
        let re = compile("a(b)(c)");
        assert!(re.is_full_match(b"abc", MatchFlags::empty()));
        assert!(!re.is_full_match(b"abcd", MatchFlags::empty()));
        assert!(!re.is_full_match(b"xabc", MatchFlags::empty()));

        let result = re.full_match(b"abc", MatchFlags::empty()).unwrap();
        assert_eq!(groups(&result), ["abc", "b", "c"]);
        assert_eq!(re.group_len(), 3);
    }

    #[test]
    fn test_full_match_ignores_alternation_order() {
        let re = compile("(a|ab)");
        assert!(re.is_full_match(b"ab", MatchFlags::empty()));
        let result = re.full_match(b"ab", MatchFlags::empty()).unwrap();
        assert_eq!(groups(&result), ["ab", "ab"]);
    }

    #[test]
    fn test_unmatched_group_is_empty() {
        let re = compile("a(x)?b");
        let result = re.full_match(b"ab", MatchFlags::empty()).unwrap();
        assert_eq!(groups(&result), ["ab", ""]);
    }

    #[test]
    fn test_nosubs_records_only_whole_match() {
        let re = CompiledPattern::new(
            b"(a)(b)",
            Grammar::EcmaScript,
            SyntaxOptions::NOSUBS,
            &Locale::default(),
        )
        .unwrap();
        let result = re.full_match(b"ab", MatchFlags::empty()).unwrap();
        assert_eq!(groups(&result), ["ab"]);
        let (result, _) = re.search(b"xab", 0, MatchFlags::empty()).unwrap().unwrap();
        assert_eq!(groups(&result), ["ab"]);
    }

    #[test]
    fn test_icase() {
        let re = CompiledPattern::new(
            b"hello",
            Grammar::EcmaScript,
            SyntaxOptions::ICASE,
            &Locale::default(),
        )
        .unwrap();
        assert!(re.is_full_match(b"HeLLo", MatchFlags::empty()));
    }

    #[test]
    fn test_search_position_is_relative() {
        let re = compile("abc");
        let (result, pos) = re.search(b"xxabcxx", 2, MatchFlags::empty()).unwrap().unwrap();
        assert_eq!(pos, 0);
        assert_eq!(groups(&result), ["abc"]);

        let (_, pos) = re.search(b"xxabcxx", 0, MatchFlags::empty()).unwrap().unwrap();
        assert_eq!(pos, 2);
        assert!(re.search(b"xxabcxx", 3, MatchFlags::empty()).unwrap().is_none());
    }

    #[test]
    fn test_search_start_out_of_range() {
        let re = compile("a");
        assert!(re.search(b"abc", 3, MatchFlags::empty()).unwrap().is_none());
        assert!(matches!(
            re.search(b"abc", 4, MatchFlags::empty()),
            Err(RegexError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_edge_flags() {
        let re = compile("^a");
        assert!(re.search(b"ab", 0, MatchFlags::NOT_BOL).unwrap().is_none());
        assert!(re.search(b"ab", 0, MatchFlags::empty()).unwrap().is_some());

        let re = compile("b$");
        assert!(re.search(b"ab", 0, MatchFlags::NOT_EOL).unwrap().is_none());
        assert!(!re.is_full_match(b"b", MatchFlags::NOT_EOL));
        assert!(compile("b").is_full_match(b"b", MatchFlags::NOT_EOL));

        let re = compile(r"\bcat");
        assert!(re.search(b"cat", 0, MatchFlags::NOT_BOW).unwrap().is_none());
        assert!(re.search(b"cat", 0, MatchFlags::empty()).unwrap().is_some());
    }

    #[test]
    fn test_word_edge_flags_leave_line_anchors_at_non_word_edges() {
        let re = compile("^ x");
        assert!(re.search(b" x", 0, MatchFlags::NOT_BOW).unwrap().is_some());
        assert!(re.is_full_match(b" x", MatchFlags::NOT_BOW));

        let re = compile("x $");
        assert!(re.search(b"x ", 0, MatchFlags::NOT_EOW).unwrap().is_some());
        assert!(re.is_full_match(b"x ", MatchFlags::NOT_EOW));

        let re = compile(r"cat\b");
        assert!(re.search(b"cat", 0, MatchFlags::NOT_EOW).unwrap().is_none());
    }

    #[test]
    fn test_prev_avail_uses_preceding_text() {
        let re = compile("^b");
        assert!(re.search(b"ab", 1, MatchFlags::empty()).unwrap().is_some());
        assert!(re.search(b"ab", 1, MatchFlags::PREV_AVAIL).unwrap().is_none());

        let re = compile(r"\bb");
        assert!(re.search(b"ab", 1, MatchFlags::PREV_AVAIL).unwrap().is_none());
        assert!(re.search(b"a b", 2, MatchFlags::PREV_AVAIL).unwrap().is_some());
    }

    #[test]
    fn test_continuous_and_not_null() {
        let re = compile("b");
        assert!(re.search(b"ab", 0, MatchFlags::CONTINUOUS).unwrap().is_none());
        assert!(re.search(b"ba", 0, MatchFlags::CONTINUOUS).unwrap().is_some());

        let re = compile("x*");
        let (result, pos) = re.search(b"abxx", 0, MatchFlags::NOT_NULL).unwrap().unwrap();
        assert_eq!((groups(&result), pos), (vec!["xx"], 2));
        assert!(re.search(b"abc", 0, MatchFlags::NOT_NULL).unwrap().is_none());
        assert!(!re.is_full_match(b"", MatchFlags::NOT_NULL));
        assert!(re.is_full_match(b"", MatchFlags::empty()));
    }

    #[test]
    fn test_replace_global() {
        assert_eq!(
            replace(r"(\d+)-(\d+)-(\d+)", "2024-01-02", "$3/$2/$1", MatchFlags::empty()),
            "02/01/2024"
        );
        assert_eq!(replace("a", "banana", "o", MatchFlags::empty()), "bonono");
        assert_eq!(replace("z", "banana", "o", MatchFlags::empty()), "banana");
    }

    #[test]
    fn test_replace_empty_matches() {
        assert_eq!(replace("x*", "abc", "-", MatchFlags::empty()), "-a-b-c-");
        assert_eq!(replace("c*", "abc", "-", MatchFlags::empty()), "-a-b--");
        assert_eq!(replace("x*", "", "-", MatchFlags::empty()), "-");
    }

    #[test]
    fn test_replace_format_flags() {
        assert_eq!(replace("a", "banana", "o", MatchFlags::FORMAT_FIRST_ONLY), "bonana");
        assert_eq!(replace("a", "banana", "o", MatchFlags::FORMAT_NO_COPY), "ooo");
        assert_eq!(replace("(n)a", "banana", r"[\1]", MatchFlags::FORMAT_SED), "ba[n][n]");
        assert_eq!(replace("n", "banana", "($`)", MatchFlags::empty()), "ba(ba)a(a)a");
    }

    #[test]
    fn test_utf8_locale() {
        let locale = Locale::new("en_US.UTF-8");
        let re = CompiledPattern::new(b"\\w+", Grammar::EcmaScript, SyntaxOptions::empty(), &locale)
            .unwrap();
        assert!(re.is_full_match("été".as_bytes(), MatchFlags::empty()));
        let re = compile(r"\w+");
        assert!(!re.is_full_match("été".as_bytes(), MatchFlags::empty()));
    }

    #[test]
    fn test_posix_grammars() {
        let re = CompiledPattern::new(
            br"\(ab\)*c",
            Grammar::Basic,
            SyntaxOptions::empty(),
            &Locale::default(),
        )
        .unwrap();
        let result = re.full_match(b"ababc", MatchFlags::empty()).unwrap();
        assert_eq!(groups(&result), ["ababc", "ab"]);

        let re = CompiledPattern::new(b"cat\ndog", Grammar::Egrep, SyntaxOptions::empty(), &Locale::default())
            .unwrap();
        assert!(re.is_full_match(b"dog", MatchFlags::empty()));
    }

    #[test]
    fn test_ecmascript_dot_stops_at_line_terminators() {
        let re = compile("a.b");
        assert!(re.is_full_match(b"axb", MatchFlags::empty()));
        assert!(!re.is_full_match(b"a\rb", MatchFlags::empty()));
        assert!(!re.is_full_match(b"a\nb", MatchFlags::empty()));
    }

    #[test]
    fn test_backreferences() {
        let re = compile(r"(a+)b\1");
        assert!(re.is_full_match(b"aabaa", MatchFlags::empty()));
        assert!(!re.is_full_match(b"aaba", MatchFlags::empty()));
        let result = re.full_match(b"aabaa", MatchFlags::empty()).unwrap();
        assert_eq!(groups(&result), ["aabaa", "aa"]);

        let (result, pos) = re.search(b"aaba", 0, MatchFlags::empty()).unwrap().unwrap();
        assert_eq!((groups(&result), pos), (vec!["aba", "a"], 1));

        assert_eq!(replace(r"(\w)\1", "aabbcd", "<$1>", MatchFlags::empty()), "<a><b>cd");
    }

    #[test]
    fn test_lookahead() {
        let re = compile("a(?=b)");
        let (result, pos) = re.search(b"acab", 0, MatchFlags::empty()).unwrap().unwrap();
        assert_eq!((groups(&result), pos), (vec!["a"], 2));
        assert!(!re.is_full_match(b"a", MatchFlags::empty()));

        let re = compile("a(?!b)");
        let (_, pos) = re.search(b"abac", 0, MatchFlags::empty()).unwrap().unwrap();
        assert_eq!(pos, 2);
    }

    #[test]
    fn test_backtracking_honors_edge_flags() {
        let re = compile(r"(a)\1$");
        assert!(re.search(b"aa", 0, MatchFlags::empty()).unwrap().is_some());
        assert!(re.search(b"aa", 0, MatchFlags::NOT_EOL).unwrap().is_none());
        assert!(!re.is_full_match(b"aa", MatchFlags::NOT_EOL));

        // The trailing context byte is never part of a match.
        let re = compile(r"(a)\1.");
        assert!(re.search(b"aa", 0, MatchFlags::NOT_EOL).unwrap().is_none());
        assert!(compile(r"(a)\1").is_full_match(b"aa", MatchFlags::NOT_EOL));

        let re = compile(r"^(a)\1");
        assert!(re.search(b"aa", 0, MatchFlags::NOT_BOL).unwrap().is_none());
        assert!(re.search(b"baa", 1, MatchFlags::CONTINUOUS).unwrap().is_some());
        assert!(compile(r"(a)\1").search(b"baa", 0, MatchFlags::CONTINUOUS).unwrap().is_none());
    }

    #[test]
    fn test_backreferences_in_byte_mode() {
        let re = CompiledPattern::new(
            &[b'(', 0xE9, b')', b'\\', b'1'],
            Grammar::EcmaScript,
            SyntaxOptions::empty(),
            &Locale::default(),
        )
        .unwrap();
        let (result, pos) = re.search(&[b'x', 0xE9, 0xE9], 0, MatchFlags::empty()).unwrap().unwrap();
        assert_eq!(pos, 1);
        assert_eq!(result.group(1), Some(&[0xE9][..]));
    }

    #[test]
    fn test_posix_backreferences() {
        let re = CompiledPattern::new(
            br"\(ab\)\1",
            Grammar::Basic,
            SyntaxOptions::empty(),
            &Locale::default(),
        )
        .unwrap();
        assert!(re.is_full_match(b"abab", MatchFlags::empty()));
        assert!(!re.is_full_match(b"abba", MatchFlags::empty()));

        let re = CompiledPattern::new(
            br"(x|y)\1",
            Grammar::Extended,
            SyntaxOptions::empty(),
            &Locale::default(),
        )
        .unwrap();
        assert!(re.is_full_match(b"yy", MatchFlags::empty()));
        assert!(!re.is_full_match(b"xy", MatchFlags::empty()));
        assert_eq!(re.group_len(), 2);
    }
}
