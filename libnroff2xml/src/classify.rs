//! Line classification
//!
//! Every source line falls into exactly one [`LineKind`]. Headings are
//! recognized purely by their numeric prefix (`1.`, `2.3.`, up to four
//! groups); numbering deeper than four groups is left as body text.
//!
//! The classifier also carries the table-of-contents skip state: once a
//! "Table of Contents" line is seen, everything up to the next `.ti 0`
//! directive is discarded so the contents listing is never mistaken for real
//! section structure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sections::{Heading, SectionId};

/// Prefix marking an nroff request line.
pub const CONTROL_PREFIX: char = '.';

/// `.ti 0`, the temporary indent reset that precedes every heading.
static NESTING_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.ti\s*0\s*$").unwrap());

static TOC_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*table\s+of\s+contents\s*$").unwrap());

/// One to four `<digits>.` groups, whitespace, then a title.
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*((?:\d+\.){1,4})\s+(\S.*)$").unwrap());

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Discarded because it lies inside the table of contents.
    Skipped,
    /// Any other request line; dropped.
    ControlMarker,
    /// The `.ti 0` directive.
    NestingBoundary,
    /// A "Table of Contents" heading.
    TocStart,
    /// A numbered section heading.
    Heading(Heading),
    /// Anything else.
    BodyText(&'a str),
}

/// Classify a single line without regard to surrounding state.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if NESTING_BOUNDARY.is_match(line) {
        return LineKind::NestingBoundary;
    }
    if line.starts_with(CONTROL_PREFIX) {
        return LineKind::ControlMarker;
    }
    if TOC_START.is_match(line) {
        return LineKind::TocStart;
    }
    if let Some(heading) = parse_heading(line) {
        return LineKind::Heading(heading);
    }
    LineKind::BodyText(line)
}

/// Parse a numbered heading such as `2.1.  Overview`.
pub fn parse_heading(line: &str) -> Option<Heading> {
    let caps = HEADING.captures(line)?;
    let components = caps[1]
        .split('.')
        .filter(|group| !group.is_empty())
        .map(|group| group.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;
    Some(Heading {
        id: SectionId::new(components)?,
        title: caps[2].trim_end().to_string(),
    })
}

/// Stateful classifier for a forward scan.
#[derive(Debug, Default)]
pub struct Classifier {
    in_toc: bool,
    heading_expected: bool,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the next line of the scan.
    pub fn classify<'a>(&mut self, line: &'a str) -> LineKind<'a> {
        if self.in_toc {
            if NESTING_BOUNDARY.is_match(line) {
                self.in_toc = false;
                self.heading_expected = true;
                return LineKind::NestingBoundary;
            }
            return LineKind::Skipped;
        }

        let kind = classify_line(line);
        if kind == LineKind::TocStart {
            self.in_toc = true;
        }
        self.heading_expected = kind == LineKind::NestingBoundary;
        kind
    }

    /// Whether the previous line was a `.ti 0` directive.
    pub fn heading_expected(&self) -> bool {
        self.heading_expected
    }
}
