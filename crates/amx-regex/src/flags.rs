//! Flag translation
//!
//! Scripts pass options as plain cells. These tables turn them into the
//! native option sets the engine understands. Translation is total: unknown
//! bits are ignored and an unknown grammar falls back to ECMAScript.

use amx_sdk::Cell;
use bitflags::bitflags;

// ============================================================================
// Script-side values (must match the companion include file)
// ============================================================================

/// `E_REGEX_FLAG` values.
pub mod regex_flag {
    use amx_sdk::Cell;

    /// No options.
    pub const REGEX_DEFAULT: Cell = 0;
    /// Case-insensitive matching.
    pub const REGEX_ICASE: Cell = 1 << 0;
    /// Record only the whole match.
    pub const REGEX_NOSUBS: Cell = 1 << 1;
    /// Favor match speed over construction time.
    pub const REGEX_OPTIMIZE: Cell = 1 << 2;
    /// Locale-sensitive character ranges.
    pub const REGEX_COLLATE: Cell = 1 << 3;
}

/// `E_REGEX_GRAMMAR` values.
pub mod regex_grammar {
    use amx_sdk::Cell;

    /// ECMAScript (the default).
    pub const REGEX_ECMASCRIPT: Cell = 0;
    /// POSIX basic.
    pub const REGEX_BASIC: Cell = 1;
    /// POSIX extended.
    pub const REGEX_EXTENDED: Cell = 2;
    /// awk.
    pub const REGEX_AWK: Cell = 3;
    /// grep.
    pub const REGEX_GREP: Cell = 4;
    /// egrep.
    pub const REGEX_EGREP: Cell = 5;
}

/// `E_MATCH_FLAG` values.
pub mod match_flag {
    use amx_sdk::Cell;

    /// No flags.
    pub const MATCH_DEFAULT: Cell = 0;
    /// The target start is not a line start.
    pub const MATCH_NOT_BOL: Cell = 1 << 0;
    /// The target end is not a line end.
    pub const MATCH_NOT_EOL: Cell = 1 << 1;
    /// The target start is not a word start.
    pub const MATCH_NOT_BOW: Cell = 1 << 2;
    /// The target end is not a word end.
    pub const MATCH_NOT_EOW: Cell = 1 << 3;
    /// Any match is acceptable.
    pub const MATCH_ANY: Cell = 1 << 4;
    /// Empty matches do not count.
    pub const MATCH_NOT_NULL: Cell = 1 << 5;
    /// The match must begin at the target start.
    pub const MATCH_CONTINUOUS: Cell = 1 << 6;
    /// Text before the target is valid context.
    pub const MATCH_PREV_AVAIL: Cell = 1 << 7;
    /// Replacement templates use sed syntax.
    pub const MATCH_FORMAT_SED: Cell = 1 << 8;
    /// Replace drops the unmatched text.
    pub const MATCH_FORMAT_NO_COPY: Cell = 1 << 9;
    /// Replace only the first match.
    pub const MATCH_FORMAT_FIRST_ONLY: Cell = 1 << 10;
}

// ============================================================================
// Native option sets
// ============================================================================

/// Pattern dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Grammar {
    /// ECMAScript-like syntax, the engine's own dialect.
    #[default]
    EcmaScript,
    /// POSIX basic regular expressions.
    Basic,
    /// POSIX extended regular expressions.
    Extended,
    /// awk: extended syntax plus C-style escapes.
    Awk,
    /// grep: basic syntax, newline separates alternatives.
    Grep,
    /// egrep: extended syntax, newline separates alternatives.
    Egrep,
}

bitflags! {
    /// Compile-time options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SyntaxOptions: u32 {
        /// Case-insensitive matching.
        const ICASE = 1 << 0;
        /// Record only the whole match.
        const NOSUBS = 1 << 1;
        /// Allow a fully compiled DFA.
        const OPTIMIZE = 1 << 2;
        /// Locale-sensitive ranges; ranges use code point order.
        const COLLATE = 1 << 3;
    }
}

bitflags! {
    /// Match-time options, including replacement formatting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFlags: u32 {
        /// `^` does not match at the target start.
        const NOT_BOL = 1 << 0;
        /// `$` does not match at the target end.
        const NOT_EOL = 1 << 1;
        /// `\b` does not match at the target start.
        const NOT_BOW = 1 << 2;
        /// `\b` does not match at the target end.
        const NOT_EOW = 1 << 3;
        /// Accepted; any match already qualifies.
        const ANY = 1 << 4;
        /// Skip empty matches.
        const NOT_NULL = 1 << 5;
        /// Anchor the match at the search start.
        const CONTINUOUS = 1 << 6;
        /// Text before the search start is context.
        const PREV_AVAIL = 1 << 7;
        /// sed replacement templates.
        const FORMAT_SED = 1 << 8;
        /// Drop unmatched text from replace output.
        const FORMAT_NO_COPY = 1 << 9;
        /// Replace the first match only.
        const FORMAT_FIRST_ONLY = 1 << 10;
    }
}

const GRAMMAR_TABLE: [(Cell, Grammar); 6] = [
    (regex_grammar::REGEX_ECMASCRIPT, Grammar::EcmaScript),
    (regex_grammar::REGEX_BASIC, Grammar::Basic),
    (regex_grammar::REGEX_EXTENDED, Grammar::Extended),
    (regex_grammar::REGEX_AWK, Grammar::Awk),
    (regex_grammar::REGEX_GREP, Grammar::Grep),
    (regex_grammar::REGEX_EGREP, Grammar::Egrep),
];

const SYNTAX_OPTION_TABLE: [(Cell, SyntaxOptions); 4] = [
    (regex_flag::REGEX_ICASE, SyntaxOptions::ICASE),
    (regex_flag::REGEX_NOSUBS, SyntaxOptions::NOSUBS),
    (regex_flag::REGEX_OPTIMIZE, SyntaxOptions::OPTIMIZE),
    (regex_flag::REGEX_COLLATE, SyntaxOptions::COLLATE),
];

const MATCH_FLAG_TABLE: [(Cell, MatchFlags); 11] = [
    (match_flag::MATCH_NOT_BOL, MatchFlags::NOT_BOL),
    (match_flag::MATCH_NOT_EOL, MatchFlags::NOT_EOL),
    (match_flag::MATCH_NOT_BOW, MatchFlags::NOT_BOW),
    (match_flag::MATCH_NOT_EOW, MatchFlags::NOT_EOW),
    (match_flag::MATCH_ANY, MatchFlags::ANY),
    (match_flag::MATCH_NOT_NULL, MatchFlags::NOT_NULL),
    (match_flag::MATCH_CONTINUOUS, MatchFlags::CONTINUOUS),
    (match_flag::MATCH_PREV_AVAIL, MatchFlags::PREV_AVAIL),
    (match_flag::MATCH_FORMAT_SED, MatchFlags::FORMAT_SED),
    (match_flag::MATCH_FORMAT_NO_COPY, MatchFlags::FORMAT_NO_COPY),
    (match_flag::MATCH_FORMAT_FIRST_ONLY, MatchFlags::FORMAT_FIRST_ONLY),
];

/// Grammar selector → grammar; unknown values mean ECMAScript.
pub fn grammar(selector: Cell) -> Grammar {
    GRAMMAR_TABLE
        .iter()
        .find(|(value, _)| *value == selector)
        .map(|&(_, g)| g)
        .unwrap_or_default()
}

/// Compile option mask → native options.
pub fn syntax_options(mask: Cell) -> SyntaxOptions {
    SYNTAX_OPTION_TABLE
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .fold(SyntaxOptions::empty(), |acc, &(_, opt)| acc | opt)
}

/// Match option mask → native options.
pub fn match_flags(mask: Cell) -> MatchFlags {
    MATCH_FLAG_TABLE
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .fold(MatchFlags::empty(), |acc, &(_, flag)| acc | flag)
}
