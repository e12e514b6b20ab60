//! Active locale
//!
//! The locale decides how pattern and subject bytes are interpreted. It is
//! read once per script context and captured by every pattern compiled in
//! it, so a pattern never changes behavior after construction.

/// Default locale name.
pub const DEFAULT_LOCALE: &str = "C";

/// How subject and pattern bytes are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextMode {
    /// One byte per character; ASCII classes and case folding.
    Bytes,
    /// UTF-8 text; Unicode classes and case folding.
    Utf8,
}

/// A named locale and the text mode it implies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    name: String,
    mode: TextMode,
}

impl Locale {
    /// Resolve a locale by name. Any name mentioning UTF-8 selects UTF-8
    /// mode; everything else is treated as a single-byte locale.
    pub fn new(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let mode = if lower.contains("utf-8") || lower.contains("utf8") {
            TextMode::Utf8
        } else {
            TextMode::Bytes
        };
        Self {
            name: name.to_string(),
            mode,
        }
    }

    /// The name as configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text mode patterns compiled under this locale use.
    pub fn mode(&self) -> TextMode {
        self.mode
    }

    /// Whether the first character of `text` is a word character (`\w`).
    pub(crate) fn is_word_start(&self, text: &[u8]) -> bool {
        match self.mode {
            TextMode::Bytes => text.first().is_some_and(|&b| is_ascii_word(b)),
            TextMode::Utf8 => first_char(text).is_some_and(is_unicode_word),
        }
    }

    /// Whether the last character of `text` is a word character.
    pub(crate) fn is_word_end(&self, text: &[u8]) -> bool {
        match self.mode {
            TextMode::Bytes => text.last().is_some_and(|&b| is_ascii_word(b)),
            TextMode::Utf8 => last_char(text).is_some_and(is_unicode_word),
        }
    }

    /// Byte offset of the character after the one starting at `at`.
    pub(crate) fn next_boundary(&self, text: &[u8], at: usize) -> usize {
        match self.mode {
            TextMode::Bytes => at + 1,
            TextMode::Utf8 => {
                let mut next = at + 1;
                while next < text.len() && (text[next] & 0xC0) == 0x80 {
                    next += 1;
                }
                next
            }
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

fn is_ascii_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_unicode_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn first_char(text: &[u8]) -> Option<char> {
    let len = text.len().min(4);
    (1..=len).find_map(|n| std::str::from_utf8(&text[..n]).ok()?.chars().next())
}

fn last_char(text: &[u8]) -> Option<char> {
    let len = text.len().min(4);
    (1..=len).find_map(|n| {
        std::str::from_utf8(&text[text.len() - n..])
            .ok()?
            .chars()
            .next_back()
    })
}
