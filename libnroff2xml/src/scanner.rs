//! Line source
//!
//! Splits the manuscript into numbered lines. Both conversion passes walk the
//! same slice, so the scan happens once per conversion.

/// A single source line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Line content without the terminator.
    pub text: &'a str,
    /// 1-based line number for diagnostics.
    pub line_num: usize,
}

impl<'a> SourceLine<'a> {
    /// Returns `true` for empty or whitespace-only lines.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Scan source text into numbered lines.
///
/// Accepts `\n` and `\r\n` terminators. A leading byte order mark is dropped
/// and a final terminator does not produce an extra empty line.
pub fn scan(source: &str) -> Vec<SourceLine<'_>> {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    let lines: Vec<SourceLine<'_>> = source
        .lines()
        .enumerate()
        .map(|(idx, text)| SourceLine {
            text,
            line_num: idx + 1,
        })
        .collect();
    log::info!("Read {} lines.", lines.len());
    lines
}
