//! nroff to xml2rfc converter.
//!
//! Turns a heading-numbered nroff RFC manuscript into an xml2rfc document
//! with nested `<section>` elements, `<t>` paragraphs, cross-referenced
//! citations and a references list.
//!
//! # Conversion Pipeline
//!
//! The converter runs in four phases:
//!
//! 1. **Scanner**: splits the source into numbered lines.
//!
//! 2. **Reference Index** (pass 1): scans the whole document for the
//!    references region and resolves every `[anchor] text.` record. This must
//!    finish first because citations may precede their records.
//!
//! 3. **Outline** (pass 2): classifies each line, drives the section stack
//!    and paragraph accumulator, and expands citations inline, producing a
//!    flat stream of open/close/paragraph events.
//!
//! 4. **Assembly**: wraps the outline and the references in the xml2rfc
//!    document skeleton.
//!
//! The only fatal condition is a heading that nests more than one level
//! deeper than the open section. Everything else degrades gracefully.

mod assemble;
mod citations;
mod classify;
mod error;
mod options;
mod outline;
mod paragraph;
mod references;
mod scanner;
mod sections;

pub use assemble::{assemble, VERSION};
pub use citations::CitationExpander;
pub use classify::{classify_line, parse_heading, Classifier, LineKind, CONTROL_PREFIX};
pub use error::{ConvertContext, ConvertError, Result};
pub use options::{Options, DEFAULT_BIBXML_URL, DEFAULT_DOC_NAME};
pub use outline::OutlineEvent;
pub use paragraph::{escape_attribute, escape_text, Paragraph, ParagraphAccumulator};
pub use references::{Reference, ReferenceIndex, Region, ResolvedId, PLACEHOLDER_PREFIX};
pub use scanner::{scan, SourceLine};
pub use sections::{Heading, Section, SectionId, SectionStack};

/// Convert an nroff manuscript to xml2rfc XML with default options.
///
/// # Example
///
/// ```
/// use libnroff2xml::convert;
///
/// let xml = convert("1. Introduction\nHello.\n").unwrap();
/// assert!(xml.contains("<section title=\"Introduction\">"));
/// ```
pub fn convert(input: &str) -> Result<String> {
    convert_with_options(input, &Options::default())
}

/// Convert an nroff manuscript to xml2rfc XML.
pub fn convert_with_options(input: &str, options: &Options) -> Result<String> {
    let (index, events) = build_outline(input, options)?;

    // Phase 4: Assemble the document
    Ok(assemble::assemble(&index, &events, options))
}

/// Run both passes without producing output.
pub fn check(input: &str, options: &Options) -> Result<()> {
    build_outline(input, options).map(|_| ())
}

/// Run both passes, returning the reference index and the outline events.
pub fn build_outline(
    input: &str,
    options: &Options,
) -> Result<(ReferenceIndex, Vec<OutlineEvent>)> {
    let ctx = ConvertContext::new(options.source_name.as_deref());

    // Phase 1: Split source into lines
    let lines = scanner::scan(input);

    // Phase 2: Collect and resolve references
    let index = ReferenceIndex::build(&lines);

    // Phase 3: Build the section outline
    let events = outline::build(&lines, &index).map_err(|e| e.in_file(&ctx))?;

    Ok((index, events))
}
