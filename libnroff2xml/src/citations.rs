//! Citation expansion
//!
//! Rewrites bracketed citations such as `[RFC2119]` into `<xref>` elements
//! pointing at the resolved reference. Matching works on whole bracket
//! tokens, so anchor `1` never fires inside `[12]`. Brackets whose content is
//! not a registered anchor are left alone.
//!
//! Input lines are already escaped, so anchors are compared in their escaped
//! form and the inserted markup is never escaped again.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::paragraph::escape_text;
use crate::references::ReferenceIndex;

static BRACKET_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").unwrap());
/// The anchor that opens a bibliography record.
static RECORD_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[[^\[\]]+\]").unwrap());

/// Expands citations against a complete reference index.
#[derive(Debug)]
pub struct CitationExpander<'a> {
    targets: HashMap<String, &'a str>,
}

impl<'a> CitationExpander<'a> {
    pub fn new(index: &'a ReferenceIndex) -> Self {
        let targets = index
            .iter()
            .map(|reference| {
                (
                    escape_text(&reference.anchor).into_owned(),
                    reference.resolved_id.as_str(),
                )
            })
            .collect();
        Self { targets }
    }

    /// Replace every registered citation in an escaped line.
    pub fn expand<'t>(&self, line: &'t str) -> Cow<'t, str> {
        if self.targets.is_empty() {
            return Cow::Borrowed(line);
        }
        BRACKET_TOKEN.replace_all(line, |caps: &Captures<'_>| {
            match self.targets.get(&caps[1]) {
                Some(target) => xref(target),
                None => caps[0].to_string(),
            }
        })
    }

    /// Expand a line of the references region. A leading `[anchor]` names
    /// the record itself and stays literal; later citations are expanded.
    pub fn expand_record<'t>(&self, line: &'t str) -> Cow<'t, str> {
        let Some(anchor) = RECORD_ANCHOR.find(line) else {
            return self.expand(line);
        };
        let (head, rest) = line.split_at(anchor.end());
        match self.expand(rest) {
            Cow::Borrowed(_) => Cow::Borrowed(line),
            Cow::Owned(expanded) => Cow::Owned(format!("{}{}", head, expanded)),
        }
    }
}

/// Cross-reference element for a resolved identifier.
pub fn xref(target: &str) -> String {
    format!("<xref target=\"{}\"/>", target)
}
