//! Grammar translation
//!
//! The engine speaks one dialect. POSIX-flavoured patterns are rewritten
//! into it before compilation; ECMAScript patterns pass through almost
//! untouched. In byte mode every non-ASCII pattern byte becomes a `\xHH`
//! literal so it matches exactly that byte.
//!
//! Back-references and look-ahead have no automaton form. They are kept in
//! the output and flagged, and the pattern goes to the backtracking engine.

use crate::error::{RegexError, RegexResult};
use crate::flags::Grammar;
use crate::locale::TextMode;

/// A pattern rewritten into engine syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// The rewritten pattern.
    pub pattern: String,
    /// Uses back-references or look-ahead.
    pub backtrack: bool,
}

/// Rewrite `pattern` in `grammar` into engine syntax.
pub fn translate(pattern: &[u8], grammar: Grammar, mode: TextMode) -> RegexResult<Translation> {
    let chars: Vec<char> = match mode {
        TextMode::Bytes => pattern.iter().map(|&b| b as char).collect(),
        TextMode::Utf8 => std::str::from_utf8(pattern)
            .map_err(|_| compile_error("pattern is not valid UTF-8"))?
            .chars()
            .collect(),
    };

    let mut t = Translator {
        chars,
        pos: 0,
        out: String::with_capacity(pattern.len() * 2),
        mode,
        backtrack: false,
    };
    match grammar {
        Grammar::EcmaScript => t.ecmascript(),
        Grammar::Basic => t.basic(false),
        Grammar::Grep => t.basic(true),
        Grammar::Extended => t.extended(false, false),
        Grammar::Egrep => t.extended(true, false),
        Grammar::Awk => t.extended(false, true),
    }?;
    Ok(Translation {
        pattern: t.out,
        backtrack: t.backtrack,
    })
}

fn compile_error(msg: &str) -> RegexError {
    RegexError::Compile(msg.to_string())
}

struct Translator {
    chars: Vec<char>,
    pos: usize,
    out: String,
    mode: TextMode,
    backtrack: bool,
}

impl Translator {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// A character that must match itself.
    fn literal(&mut self, c: char) {
        if c.is_ascii() {
            if regex_syntax::is_meta_character(c) {
                self.out.push('\\');
            }
            self.out.push(c);
        } else {
            self.non_ascii(c);
        }
    }

    /// A character that must match itself inside a class.
    fn class_literal(&mut self, c: char) {
        if c.is_ascii_alphanumeric() {
            self.out.push(c);
        } else if c.is_ascii() {
            self.out.push_str(&format!("\\x{:02X}", c as u32));
        } else {
            self.non_ascii(c);
        }
    }

    fn non_ascii(&mut self, c: char) {
        match self.mode {
            // Bytes were widened 1:1, so `c` is below 0x100.
            TextMode::Bytes => self.out.push_str(&format!("\\x{:02X}", c as u32)),
            TextMode::Utf8 => self.out.push(c),
        }
    }

    /// Back-reference to group `first` (plus any digits that follow when
    /// `multi_digit`). The group is closed so a following digit stays a
    /// literal.
    fn backreference(&mut self, first: char, multi_digit: bool) {
        self.backtrack = true;
        self.out.push_str("(?:\\");
        self.out.push(first);
        while multi_digit {
            match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.out.push(d);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        self.out.push(')');
    }

    // ========================================================================
    // ECMAScript
    // ========================================================================

    fn ecmascript(&mut self) -> RegexResult<()> {
        let mut in_class = false;
        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some(d @ '1'..='9') if !in_class => self.backreference(d, true),
                    Some('0') => self.out.push_str("\\x00"),
                    // Identity escapes of non-syntax characters are plain
                    // literals; the engine would read some (`\<`) as
                    // assertions.
                    Some(n) if n.is_ascii_punctuation() || n == ' ' => self.literal(n),
                    Some(n) if n.is_ascii() => {
                        self.out.push('\\');
                        self.out.push(n);
                    }
                    Some(n) => self.non_ascii(n),
                    None => return Err(compile_error("trailing backslash")),
                },
                '[' if !in_class => {
                    in_class = true;
                    self.out.push('[');
                }
                // A bracket inside a class is a literal here, a nested
                // class to the engine.
                '[' => self.out.push_str("\\["),
                ']' if in_class => {
                    in_class = false;
                    self.out.push(']');
                }
                '.' if !in_class => self.out.push_str("[^\\n\\r]"),
                '(' if !in_class
                    && self.peek() == Some('?')
                    && matches!(self.peek_at(1), Some('=') | Some('!')) =>
                {
                    self.backtrack = true;
                    self.out.push('(');
                }
                c if c.is_ascii() => self.out.push(c),
                c => self.non_ascii(c),
            }
        }
        Ok(())
    }

    // ========================================================================
    // POSIX basic (and grep)
    // ========================================================================

    fn basic(&mut self, newline_alternates: bool) -> RegexResult<()> {
        let mut expr_start = true;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    let Some(n) = self.bump() else {
                        return Err(compile_error("trailing backslash"));
                    };
                    match n {
                        '(' => {
                            self.out.push('(');
                            expr_start = true;
                            continue;
                        }
                        ')' => self.out.push(')'),
                        '{' => self.bre_interval()?,
                        '1'..='9' => self.backreference(n, false),
                        n => self.literal(n),
                    }
                }
                '*' if expr_start => self.literal('*'),
                '^' if expr_start => {
                    self.out.push('^');
                    continue;
                }
                '$' if self.bre_at_end(newline_alternates) => self.out.push('$'),
                '\n' if newline_alternates => {
                    self.out.push('|');
                    expr_start = true;
                    continue;
                }
                '[' => self.bracket()?,
                '.' | '*' => self.out.push(c),
                c => self.literal(c),
            }
            expr_start = false;
        }
        Ok(())
    }

    /// `$` is an anchor only at the end of an expression or group.
    fn bre_at_end(&self, newline_alternates: bool) -> bool {
        match (self.peek(), self.peek_at(1)) {
            (None, _) => true,
            (Some('\\'), Some(')')) => true,
            (Some('\n'), _) => newline_alternates,
            _ => false,
        }
    }

    /// Body of `\{m,n\}`; the opening `\{` is already consumed.
    fn bre_interval(&mut self) -> RegexResult<()> {
        let mut body = String::new();
        loop {
            match self.bump() {
                Some('\\') if self.peek() == Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c.is_ascii_digit() || c == ',' => body.push(c),
                _ => return Err(compile_error("invalid interval")),
            }
        }
        if !valid_interval(&body) {
            return Err(compile_error("invalid interval"));
        }
        self.out.push('{');
        self.out.push_str(&body);
        self.out.push('}');
        Ok(())
    }

    // ========================================================================
    // POSIX extended (egrep, awk)
    // ========================================================================

    fn extended(&mut self, newline_alternates: bool, awk: bool) -> RegexResult<()> {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    let Some(n) = self.bump() else {
                        return Err(compile_error("trailing backslash"));
                    };
                    if awk {
                        self.awk_escape(n);
                    } else if ('1'..='9').contains(&n) {
                        self.backreference(n, false);
                    } else {
                        self.literal(n);
                    }
                }
                '{' => match self.ere_interval_len() {
                    Some(len) => {
                        let body: String = self.chars[self.pos..self.pos + len].iter().collect();
                        self.pos += len;
                        self.out.push('{');
                        self.out.push_str(&body);
                    }
                    None => self.literal('{'),
                },
                '}' => self.literal('}'),
                '\n' if newline_alternates => self.out.push('|'),
                '[' => self.bracket()?,
                '(' | ')' | '|' | '*' | '+' | '?' | '.' | '^' | '$' => self.out.push(c),
                c => self.literal(c),
            }
        }
        Ok(())
    }

    /// Length of `m}`, `m,}` or `m,n}` following a `{`, if present.
    fn ere_interval_len(&self) -> Option<usize> {
        let rest = &self.chars[self.pos..];
        let close = rest.iter().position(|&c| c == '}')?;
        let body: String = rest[..close].iter().collect();
        valid_interval(&body).then_some(close + 1)
    }

    fn awk_escape(&mut self, n: char) {
        let c = match n {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'f' => '\x0C',
            'v' => '\x0B',
            'a' => '\x07',
            'b' => '\x08',
            '0'..='7' => {
                let mut value = n.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                // Octal escapes name bytes.
                char::from_u32(value & 0xFF).unwrap_or('\0')
            }
            other => other,
        };
        self.literal(c);
    }

    // ========================================================================
    // Bracket expressions (all POSIX grammars)
    // ========================================================================

    /// Body of `[...]`; the opening `[` is already consumed.
    fn bracket(&mut self) -> RegexResult<()> {
        self.out.push('[');
        if self.peek() == Some('^') {
            self.pos += 1;
            self.out.push('^');
        }
        let mut have_item = false;
        if self.peek() == Some(']') {
            self.pos += 1;
            self.class_literal(']');
            have_item = true;
        }

        loop {
            let Some(c) = self.bump() else {
                return Err(compile_error("unmatched [ in bracket expression"));
            };
            match c {
                ']' => break,
                '[' if self.peek() == Some(':') => {
                    let rest = &self.chars[self.pos + 1..];
                    let end = rest
                        .windows(2)
                        .position(|w| w == [':', ']'])
                        .ok_or_else(|| compile_error("unterminated character class name"))?;
                    let name: String = rest[..end].iter().collect();
                    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
                        return Err(compile_error("invalid character class name"));
                    }
                    self.out.push_str("[:");
                    self.out.push_str(&name);
                    self.out.push_str(":]");
                    self.pos += 1 + end + 2;
                    have_item = false;
                    continue;
                }
                '[' if matches!(self.peek(), Some('=') | Some('.')) => {
                    return Err(compile_error(
                        "equivalence classes and collating symbols are not supported",
                    ));
                }
                '-' if have_item && self.peek().is_some_and(|n| n != ']') => {
                    self.out.push('-');
                    have_item = false;
                    continue;
                }
                c => self.class_literal(c),
            }
            have_item = true;
        }
        self.out.push(']');
        Ok(())
    }
}

fn valid_interval(body: &str) -> bool {
    let (min, max) = match body.split_once(',') {
        Some((min, max)) => (min, Some(max)),
        None => (body, None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(min) && max.map_or(true, |m| m.is_empty() || digits(m))
}
