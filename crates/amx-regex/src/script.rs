//! Per-script context
//!
//! A [`Script`] owns everything one VM instance created through the bridge:
//! its compiled patterns, its match results, and the locale it was attached
//! with. Handles issued by one script never resolve in another, and
//! dropping the script releases every object it still owns.

use std::sync::Arc;

use amx_sdk::Cell;

use crate::error::{HandleKind, RegexError, RegexResult};
use crate::flags;
use crate::locale::Locale;
use crate::pattern::{CompiledPattern, MatchResult};
use crate::registry::HandleRegistry;

/// Registries and locale of one attached script.
pub struct Script {
    locale: Locale,
    patterns: HandleRegistry<Arc<CompiledPattern>>,
    matches: HandleRegistry<Arc<MatchResult>>,
}

impl Script {
    /// Fresh context; every pattern it compiles uses `locale`.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            patterns: HandleRegistry::new(HandleKind::Regex),
            matches: HandleRegistry::new(HandleKind::MatchResults),
        }
    }

    /// Locale captured when the script attached.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Live compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Live match results.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    /// Compile `pattern` and return its handle.
    pub fn new_regex(&self, pattern: &[u8], options: Cell, grammar: Cell) -> RegexResult<Cell> {
        let compiled = CompiledPattern::new(
            pattern,
            flags::grammar(grammar),
            flags::syntax_options(options),
            &self.locale,
        )?;
        let handle = self.patterns.insert(Arc::new(compiled));
        tracing::debug!(handle, "compiled pattern");
        Ok(handle)
    }

    /// Release a pattern. Fails if `handle` is not live.
    pub fn delete_regex(&self, handle: Cell) -> RegexResult<()> {
        if self.patterns.remove(handle) {
            Ok(())
        } else {
            Err(RegexError::regex_handle(handle))
        }
    }

    fn pattern(&self, handle: Cell) -> RegexResult<Arc<CompiledPattern>> {
        self.patterns.resolve(handle, Arc::clone)
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Whether the whole of `subject` matches.
    pub fn check(&self, subject: &[u8], regex: Cell, match_flags: Cell) -> RegexResult<bool> {
        let pattern = self.pattern(regex)?;
        Ok(pattern.is_full_match(subject, flags::match_flags(match_flags)))
    }

    /// Match the whole of `subject`; on success the groups are registered
    /// and their handle returned.
    pub fn regex_match(
        &self,
        subject: &[u8],
        regex: Cell,
        match_flags: Cell,
    ) -> RegexResult<Option<Cell>> {
        let pattern = self.pattern(regex)?;
        Ok(pattern
            .full_match(subject, flags::match_flags(match_flags))
            .map(|result| self.matches.insert(Arc::new(result))))
    }

    /// Search `subject[start..]`. On success returns the match handle and
    /// the match position relative to `start`.
    pub fn search(
        &self,
        subject: &[u8],
        regex: Cell,
        start: Cell,
        match_flags: Cell,
    ) -> RegexResult<Option<(Cell, Cell)>> {
        let pattern = self.pattern(regex)?;
        let start = usize::try_from(start).map_err(|_| {
            RegexError::InvalidArgument(format!("negative start offset {start}"))
        })?;
        let found = pattern.search(subject, start, flags::match_flags(match_flags))?;
        Ok(found.map(|(result, pos)| {
            let handle = self.matches.insert(Arc::new(result));
            // Subjects come out of a cell array, so the position fits a cell.
            (handle, pos as Cell)
        }))
    }

    /// Substitute matches in `subject` using `template`.
    pub fn replace(
        &self,
        subject: &[u8],
        regex: Cell,
        template: &[u8],
        match_flags: Cell,
    ) -> RegexResult<Vec<u8>> {
        let pattern = self.pattern(regex)?;
        Ok(pattern.replace(subject, template, flags::match_flags(match_flags)))
    }

    // ========================================================================
    // Match results
    // ========================================================================

    /// Text of group `index` of a recorded match.
    pub fn group(&self, handle: Cell, index: Cell) -> RegexResult<Vec<u8>> {
        self.matches.resolve(handle, |result| {
            usize::try_from(index)
                .ok()
                .and_then(|i| result.group(i))
                .map(<[u8]>::to_vec)
                .ok_or(RegexError::InvalidIndex {
                    index,
                    len: result.len(),
                })
        })?
    }

    /// Release a match result. Fails if `handle` is not live.
    pub fn free_match(&self, handle: Cell) -> RegexResult<()> {
        if self.matches.remove(handle) {
            Ok(())
        } else {
            Err(RegexError::match_handle(handle))
        }
    }

    /// Release every object this script owns. Returns how many patterns and
    /// match results were still live.
    pub fn clear(&self) -> (usize, usize) {
        (self.patterns.clear(), self.matches.clear())
    }
}

impl Drop for Script {
    fn drop(&mut self) {
        let (patterns, matches) = self.clear();
        if patterns + matches > 0 {
            tracing::debug!(patterns, matches, "released objects left by script");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{match_flag, regex_grammar};

    #[test]
    fn test_compile_and_delete_once() {
        let script = Script::new(Locale::default());
        let handle = script.new_regex(b"a+", 0, 0).unwrap();
        assert_ne!(handle, 0);
        assert_eq!(script.pattern_count(), 1);
        assert!(script.delete_regex(handle).is_ok());
        assert_eq!(script.delete_regex(handle), Err(RegexError::regex_handle(handle)));
    }

    #[test]
    fn test_match_groups() {
        let script = Script::new(Locale::default());
        let re = script.new_regex(b"a(b)(c)", 0, 0).unwrap();
        let m = script.regex_match(b"abc", re, 0).unwrap().unwrap();
        assert_eq!(script.group(m, 0).unwrap(), b"abc");
        assert_eq!(script.group(m, 1).unwrap(), b"b");
        assert_eq!(script.group(m, 2).unwrap(), b"c");
        assert_eq!(
            script.group(m, 3),
            Err(RegexError::InvalidIndex { index: 3, len: 3 })
        );
        assert!(matches!(script.group(m, -1), Err(RegexError::InvalidIndex { .. })));
        assert_eq!(script.regex_match(b"abcd", re, 0), Ok(None));
    }

    #[test]
    fn test_handle_kinds_do_not_mix() {
        let script = Script::new(Locale::default());
        let re = script.new_regex(b"x", 0, 0).unwrap();
        let m = script.regex_match(b"x", re, 0).unwrap().unwrap();
        assert_eq!(script.group(re, 0), Err(RegexError::match_handle(re)));
        assert_eq!(script.check(b"x", m, 0), Err(RegexError::regex_handle(m)));
        assert_eq!(script.check(b"x", 0, 0), Err(RegexError::regex_handle(0)));
    }

    #[test]
    fn test_scripts_are_isolated() {
        let a = Script::new(Locale::default());
        let b = Script::new(Locale::default());
        let re = a.new_regex(b"x", 0, 0).unwrap();
        assert!(matches!(b.check(b"x", re, 0), Err(RegexError::InvalidHandle { .. })));
        assert_eq!(a.check(b"x", re, 0), Ok(true));
    }

    #[test]
    fn test_search() {
        let script = Script::new(Locale::default());
        let re = script.new_regex(b"abc", 0, 0).unwrap();
        let (m, pos) = script.search(b"xxabcxx", re, 2, 0).unwrap().unwrap();
        assert_eq!(pos, 0);
        assert_eq!(script.group(m, 0).unwrap(), b"abc");
        assert!(matches!(
            script.search(b"abc", re, -1, 0),
            Err(RegexError::InvalidArgument(_))
        ));
        assert!(matches!(
            script.search(b"abc", re, 10, 0),
            Err(RegexError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_replace_first_only() {
        let script = Script::new(Locale::default());
        let re = script.new_regex(b"o", 0, regex_grammar::REGEX_EXTENDED).unwrap();
        let out = script
            .replace(b"foo boo", re, b"0", match_flag::MATCH_FORMAT_FIRST_ONLY)
            .unwrap();
        assert_eq!(out, b"f0o boo");
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let script = Script::new(Locale::default());
        let re = script.new_regex(b"x", 0, 0).unwrap();
        let m = script.regex_match(b"x", re, 0).unwrap().unwrap();
        assert_eq!(script.clear(), (1, 1));
        assert!(script.check(b"x", re, 0).is_err());
        assert!(script.group(m, 0).is_err());
        assert_eq!(script.free_match(m), Err(RegexError::match_handle(m)));
    }
}
