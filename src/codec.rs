use std::fmt::Display;

/// Delimiter used by [`LineCodec`] unless configured otherwise.
pub const DEFAULT_DELIMITER: char = ':';

/// The snapshot line codec: one `key:value` record per line.
///
/// The skip list core treats record formatting as an external concern and
/// only talks to this codec. The delimiter is per-instance configuration,
/// not a process-wide constant.
///
/// A line is valid only if it is non-empty and contains the delimiter.
/// Key and value are the substrings before and after the *first*
/// delimiter occurrence, so values may freely contain further delimiters
/// but keys may not. No escaping is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCodec {
    delimiter: char,
}

impl LineCodec {
    /// Create a codec with the given delimiter.
    pub fn new(delimiter: char) -> Self {
        LineCodec { delimiter }
    }

    /// The delimiter this codec splits on.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Render one record as a line (without the trailing newline).
    pub fn encode<K: Display, V: Display>(&self, key: &K, value: &V) -> String {
        format!("{key}{}{value}", self.delimiter)
    }

    /// Split a line into `(key, value)` on the first delimiter.
    /// Returns `None` for empty lines and lines without the delimiter.
    pub fn split<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        if line.is_empty() {
            return None;
        }
        line.split_once(self.delimiter)
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        LineCodec::new(DEFAULT_DELIMITER)
    }
}
