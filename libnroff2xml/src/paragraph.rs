//! Paragraph accumulation
//!
//! Body lines are grouped into paragraph blocks separated by blank lines.
//! Each line is escaped first and citation-expanded second, so source text
//! can never forge markup while the inserted cross-references stay intact.

use std::borrow::Cow;

use crate::citations::CitationExpander;

/// Escape the markup-sensitive characters of body text.
///
/// The output is declared US-ASCII, so anything outside ASCII becomes a
/// numeric character reference.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    ascii_only(html_escape::encode_text(text))
}

/// Escape text for use inside a double-quoted attribute.
pub fn escape_attribute(text: &str) -> Cow<'_, str> {
    ascii_only(html_escape::encode_double_quoted_attribute(text))
}

fn ascii_only(text: Cow<'_, str>) -> Cow<'_, str> {
    if text.is_ascii() {
        return text;
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("&#x{:X};", u32::from(c)));
        }
    }
    Cow::Owned(out)
}

/// A finished paragraph block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Escaped, citation-expanded lines.
    pub lines: Vec<String>,
}

/// Groups body lines into paragraphs.
#[derive(Debug)]
pub struct ParagraphAccumulator<'a> {
    expander: CitationExpander<'a>,
    open: Option<Vec<String>>,
}

impl<'a> ParagraphAccumulator<'a> {
    pub fn new(expander: CitationExpander<'a>) -> Self {
        Self {
            expander,
            open: None,
        }
    }

    /// Feed one body line.
    ///
    /// Text outside any section has no containing block and is ignored. A
    /// blank line closes the open paragraph, which is returned.
    pub fn body_line(&mut self, text: &str, in_section: bool) -> Option<Paragraph> {
        self.accept(text, in_section, false)
    }

    /// Feed one line of the references region, where a record's leading
    /// anchor is kept as text.
    pub fn record_line(&mut self, text: &str, in_section: bool) -> Option<Paragraph> {
        self.accept(text, in_section, true)
    }

    fn accept(&mut self, text: &str, in_section: bool, record: bool) -> Option<Paragraph> {
        if !in_section {
            return None;
        }
        if text.trim().is_empty() {
            return self.finish();
        }

        let escaped = escape_text(text.trim_end());
        let line = if record {
            self.expander.expand_record(&escaped)
        } else {
            self.expander.expand(&escaped)
        };
        self.open.get_or_insert_with(Vec::new).push(line.into_owned());
        None
    }

    /// Close the open paragraph, if any.
    pub fn finish(&mut self) -> Option<Paragraph> {
        self.open.take().map(|lines| Paragraph { lines })
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}
