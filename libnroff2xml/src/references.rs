//! Pass 1: Reference index
//!
//! Scans the whole manuscript once, before any structure is built, and
//! collects the bibliography. Citations may appear long before the record
//! that defines them, so the index must be complete before pass 2 starts.
//!
//! The scan has two phases:
//!
//! 1. **Region detection**: the first `<N>. References` line opens the
//!    references region; the first appendix heading (`A. ...`) or
//!    `Authors' Addresses` line after it closes the region and ends the scan.
//!    Anything after that line is never examined, including later appendices.
//!
//! 2. **Record extraction**: inside the region, non-request lines accumulate
//!    into a record buffer until a blank line. A finished buffer of the shape
//!    `[anchor] text ending in a period.` becomes a [`Reference`]; anything
//!    else is dropped.
//!
//! Each reference is then resolved: text mentioning `RFC <digits>` maps to the
//! canonical `RFC` identifier with the number padded to four digits, and
//! everything else gets a visible placeholder derived from the anchor.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::CONTROL_PREFIX;
use crate::scanner::SourceLine;

static REGION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+\.?\s+)?References?\s*$").unwrap());
static APPENDIX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^A\. ").unwrap());
static AUTHORS_ADDRESSES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Author(?:s'|'s|s)?\s+Address(?:es)?").unwrap());
static RECORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\s+(.+\.)$").unwrap());
static RFC_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bRFC\s?(\d+)").unwrap());

/// Prefix for identifiers of references that could not be resolved.
pub const PLACEHOLDER_PREFIX: &str = "unresolved-";

/// Target identifier of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedId {
    /// Canonical bibliography identifier, e.g. `RFC0042`.
    Canonical(String),
    /// Placeholder derived from the citation anchor, e.g. `unresolved-8`.
    Placeholder(String),
}

impl ResolvedId {
    /// Resolve descriptive text, falling back to a placeholder for `anchor`.
    pub fn resolve(anchor: &str, text: &str) -> Self {
        match RFC_NUMBER.captures(text) {
            Some(caps) => ResolvedId::Canonical(format!("RFC{:0>4}", &caps[1])),
            None => ResolvedId::Placeholder(placeholder_for(anchor)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResolvedId::Canonical(id) | ResolvedId::Placeholder(id) => id,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, ResolvedId::Canonical(_))
    }

    /// Zero-padded RFC number of a canonical identifier.
    pub fn rfc_number(&self) -> Option<&str> {
        match self {
            ResolvedId::Canonical(id) => id.strip_prefix("RFC"),
            ResolvedId::Placeholder(_) => None,
        }
    }
}

/// Build a placeholder identifier usable as an XML anchor.
fn placeholder_for(anchor: &str) -> String {
    let sanitized: String = anchor
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", PLACEHOLDER_PREFIX, sanitized)
}

/// A bibliography record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Citation key as written between brackets.
    pub anchor: String,
    pub resolved_id: ResolvedId,
    /// The citation sentence following the anchor.
    pub text: String,
}

/// Line span of the references region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Line of the `References` heading.
    pub start_line: usize,
    /// Line that ended the region, if one was found before end of input.
    pub end_line: Option<usize>,
}

impl Region {
    /// Whether `line` lies between the heading and the end marker, both
    /// exclusive.
    pub fn contains(&self, line: usize) -> bool {
        line > self.start_line && self.end_line.map_or(true, |end| line < end)
    }
}

/// References keyed by anchor, iterated in discovery order.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    entries: Vec<Reference>,
    by_anchor: HashMap<String, usize>,
    region: Option<Region>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the complete manuscript.
    pub fn build(lines: &[SourceLine<'_>]) -> Self {
        let mut index = Self::new();
        let mut record = String::new();

        for line in lines {
            if index.region.is_none() {
                if REGION_START.is_match(line.text) {
                    log::info!("References start in line {}.", line.line_num);
                    index.region = Some(Region {
                        start_line: line.line_num,
                        end_line: None,
                    });
                }
                continue;
            }

            if is_region_end(line.text) {
                log::info!("References end in line {}.", line.line_num);
                if let Some(region) = index.region.as_mut() {
                    region.end_line = Some(line.line_num);
                }
                break;
            }

            if line.text.starts_with(CONTROL_PREFIX) {
                continue;
            }

            if line.is_blank() {
                index.finish_record(&mut record);
            } else {
                if !record.is_empty() {
                    record.push(' ');
                }
                record.push_str(line.text.trim());
            }
        }
        index.finish_record(&mut record);

        log::info!("Found {} references.", index.len());
        for reference in index.iter() {
            log::debug!(
                "Reference {} -> {} [{}]",
                reference.anchor,
                reference.resolved_id.as_str(),
                reference.text
            );
        }
        index
    }

    /// Parse a buffered record and register it, then clear the buffer.
    fn finish_record(&mut self, record: &mut String) {
        if record.is_empty() {
            return;
        }
        match parse_record(record) {
            Some((anchor, text)) => self.insert(anchor, text),
            None => log::debug!("Ignoring text in references region: {}", record),
        }
        record.clear();
    }

    /// Register a reference. A repeated anchor replaces the earlier record but
    /// keeps its position.
    ///
    /// Placeholders are unique per anchor: when two anchors sanitize to the
    /// same placeholder, the later one gets a `-2`, `-3`, ... suffix.
    pub fn insert(&mut self, anchor: &str, text: &str) {
        let existing = self.by_anchor.get(anchor).copied();
        let resolved_id = match ResolvedId::resolve(anchor, text) {
            ResolvedId::Placeholder(id) => {
                ResolvedId::Placeholder(self.unique_placeholder(id, existing))
            }
            canonical => canonical,
        };
        let reference = Reference {
            anchor: anchor.to_string(),
            resolved_id,
            text: text.to_string(),
        };
        match existing {
            Some(idx) => {
                log::debug!("Reference [{}] redefined", anchor);
                self.entries[idx] = reference;
            }
            None => {
                self.by_anchor.insert(anchor.to_string(), self.entries.len());
                self.entries.push(reference);
            }
        }
    }

    /// First free variant of `id` among placeholders of other entries.
    fn unique_placeholder(&self, id: String, own: Option<usize>) -> String {
        let taken = |candidate: &str| {
            self.entries.iter().enumerate().any(|(idx, reference)| {
                Some(idx) != own
                    && !reference.resolved_id.is_canonical()
                    && reference.resolved_id.as_str() == candidate
            })
        };
        if !taken(&id) {
            return id;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", id, n);
            if !taken(&candidate) {
                log::debug!("Placeholder {} already in use, using {}", id, candidate);
                return candidate;
            }
            n += 1;
        }
    }

    pub fn get(&self, anchor: &str) -> Option<&Reference> {
        self.by_anchor.get(anchor).map(|&idx| &self.entries[idx])
    }

    /// Iterate references in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The references region, if the manuscript has one.
    pub fn region(&self) -> Option<Region> {
        self.region
    }
}

fn is_region_end(line: &str) -> bool {
    APPENDIX_HEADING.is_match(line) || AUTHORS_ADDRESSES.is_match(line)
}

/// Split `[anchor] text.` into its anchor and trimmed text.
fn parse_record(record: &str) -> Option<(&str, &str)> {
    let caps = RECORD.captures(record)?;
    let anchor = caps.get(1)?.as_str();
    let text = caps.get(2)?.as_str().trim();
    Some((anchor, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn build(source: &str) -> ReferenceIndex {
        ReferenceIndex::build(&scan(source))
    }

    #[test]
    fn test_resolves_rfc_number_with_padding() {
        let index = build("7. References\n\n[7] Smith, J., \"Widgets\", RFC 42, 1999.\n\n");
        let reference = index.get("7").unwrap();
        assert_eq!(reference.resolved_id, ResolvedId::Canonical("RFC0042".to_string()));
        assert_eq!(reference.resolved_id.rfc_number(), Some("0042"));
        assert_eq!(reference.text, "Smith, J., \"Widgets\", RFC 42, 1999.");
    }

    #[test]
    fn test_unresolved_placeholder() {
        let index = build("References\n[8] Jones, K., \"Gadgets\", 2000.\n");
        let reference = index.get("8").unwrap();
        assert_eq!(
            reference.resolved_id,
            ResolvedId::Placeholder("unresolved-8".to_string())
        );
        assert!(!reference.resolved_id.is_canonical());
    }

    #[test]
    fn test_placeholder_is_sanitized() {
        assert_eq!(
            ResolvedId::resolve("IEEE 802.11", "Some standard.").as_str(),
            "unresolved-IEEE_802.11"
        );
    }

    #[test]
    fn test_long_rfc_number_is_not_truncated() {
        assert_eq!(
            ResolvedId::resolve("x", "Foo, RFC 12345, 2030.").as_str(),
            "RFC12345"
        );
        assert_eq!(ResolvedId::resolve("x", "See RFC2119.").as_str(), "RFC2119");
    }

    #[test]
    fn test_multiline_record() {
        let source = "\
9.  References

[RFC2131]  Droms, R., \"Dynamic Host Configuration Protocol\",
           RFC 2131, March 1997.

";
        let index = build(source);
        let reference = index.get("RFC2131").unwrap();
        assert_eq!(
            reference.text,
            "Droms, R., \"Dynamic Host Configuration Protocol\", RFC 2131, March 1997."
        );
        assert_eq!(reference.resolved_id.as_str(), "RFC2131");
    }

    #[test]
    fn test_skips_request_lines_and_malformed_records() {
        let source = "\
2. References
.in 3
Normative references follow

.ti 0
[1] Good, RFC 1, 1969.

[broken record without period

";
        let index = build(source);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1").unwrap().resolved_id.as_str(), "RFC0001");
    }

    #[test]
    fn test_last_write_wins_keeps_discovery_order() {
        let source = "\
References

[a] First, RFC 1.

[b] Second, RFC 2.

[a] Replacement, RFC 3.

";
        let index = build(source);
        let anchors: Vec<&str> = index.iter().map(|r| r.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["a", "b"]);
        assert_eq!(index.get("a").unwrap().resolved_id.as_str(), "RFC0003");
    }

    #[test]
    fn test_region_ends_at_appendix() {
        let source = "\
1. Introduction
[0] Not a reference, RFC 9.

2. References

[1] A. Author, \"T\", RFC 1234, 2001.

A. Appendix

[2] After the region, RFC 5.

";
        let index = build(source);
        assert_eq!(index.len(), 1);
        assert!(index.get("0").is_none());
        assert!(index.get("2").is_none());
        assert_eq!(
            index.region(),
            Some(Region {
                start_line: 4,
                end_line: Some(8)
            })
        );
    }

    #[test]
    fn test_region_ends_at_authors_addresses() {
        let source = "\
References

[1] One, RFC 1.

Authors' Addresses

[2] Two, RFC 2.
";
        let index = build(source);
        assert_eq!(index.len(), 1);
        assert_eq!(index.region().unwrap().end_line, Some(5));
    }

    #[test]
    fn test_record_flushed_at_region_end() {
        let index = build("References\n[1] One, RFC 1.\nAuthor's Address\n");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_colliding_placeholders_get_suffixes() {
        let source = "\
References

[A&B] First doc, 2001.

[A+B] Second doc, 2002.

[A B] Third doc, 2003.

[A&B] First doc, revised, 2004.

";
        let index = build(source);
        let ids: Vec<&str> = index.iter().map(|r| r.resolved_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["unresolved-A_B", "unresolved-A_B-2", "unresolved-A_B-3"]
        );
        assert_eq!(index.get("A&B").unwrap().text, "First doc, revised, 2004.");
    }

    #[test]
    fn test_region_contains() {
        let region = Region {
            start_line: 4,
            end_line: Some(8),
        };
        assert!(!region.contains(4));
        assert!(region.contains(5));
        assert!(region.contains(7));
        assert!(!region.contains(8));
        let open = Region {
            start_line: 4,
            end_line: None,
        };
        assert!(open.contains(1000));
    }

    #[test]
    fn test_no_region_is_empty() {
        let index = build("1. Intro\n[1] Looks like a record, RFC 1.\n\n");
        assert!(index.is_empty());
        assert!(index.region().is_none());
    }

    #[test]
    fn test_record_anchor_stops_at_first_bracket() {
        assert_eq!(
            parse_record("[1] Foo [2] bar."),
            Some(("1", "Foo [2] bar."))
        );
        assert_eq!(parse_record("[1] No period"), None);
        assert_eq!(parse_record("Text [1] later."), None);
    }
}
