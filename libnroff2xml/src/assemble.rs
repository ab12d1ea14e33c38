//! Document assembly
//!
//! Stitches the xml2rfc document together from fixed front-matter stand-ins,
//! the outline events of pass 2 and the reference index of pass 1.

use std::collections::HashSet;

use crate::options::Options;
use crate::outline::OutlineEvent;
use crate::paragraph::{escape_attribute, escape_text};
use crate::references::{Reference, ReferenceIndex};

/// Converter version recorded in the trailing comment.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const PROCESSING_INSTRUCTIONS: &str = "\
<?xml-stylesheet type=\"text/xsl\" href=\"rfc2629.xslt\" ?>
<?rfc strict=\"yes\" ?>
<?rfc toc=\"yes\"?>
<?rfc tocdepth=\"4\"?>
<?rfc symrefs=\"yes\"?>
<?rfc sortrefs=\"yes\" ?>
<?rfc compact=\"yes\" ?>
<?rfc subcompact=\"no\" ?>
";

const FRONT: &str = "\
<front>
<title abbrev=\"Unknown(short)\">Unknown</title>
<author fullname=\"Unknown Person\" initials=\"X\" role=\"editor\" surname=\"Unknown\">
  <organization>Not converted</organization>
  <address>
    <postal>
      <street></street>
      <city>Unknown</city>
      <region></region>
      <code></code>
      <country>Unknown</country>
    </postal>
    <phone>+1 234 5678 9012</phone>
    <email>someone@example.com</email>
  </address>
</author>
<date day=\"1\" month=\"January\" year=\"1900\" />
</front>
";

/// Assemble the complete XML document.
pub fn assemble(index: &ReferenceIndex, events: &[OutlineEvent], options: &Options) -> String {
    let canonical = canonical_references(index);

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"US-ASCII\"?>\n");
    encode_doctype(&mut out, &canonical, options);
    out.push_str(PROCESSING_INSTRUCTIONS);
    out.push_str(&format!(
        "<rfc category=\"info\" docName=\"{}\" ipr=\"trust200902\">\n",
        escape_attribute(&options.doc_name)
    ));
    out.push_str(FRONT);
    out.push('\n');
    encode_middle(&mut out, events);
    encode_back(&mut out, index);
    out.push_str("</rfc>\n");
    match &options.source_name {
        Some(name) => out.push_str(&format!(
            "<!-- generated from file {} with nroff2xml {} -->\n",
            comment_safe(name),
            VERSION
        )),
        None => out.push_str(&format!("<!-- generated with nroff2xml {} -->\n", VERSION)),
    }
    out
}

/// References with a canonical identifier, first occurrence of each id only.
fn canonical_references(index: &ReferenceIndex) -> Vec<&Reference> {
    let mut seen = HashSet::new();
    index
        .iter()
        .filter(|r| r.resolved_id.is_canonical() && seen.insert(r.resolved_id.as_str()))
        .collect()
}

fn encode_doctype(out: &mut String, canonical: &[&Reference], options: &Options) {
    if canonical.is_empty() {
        out.push_str("<!DOCTYPE rfc SYSTEM \"rfc2629.dtd\">\n");
        return;
    }
    out.push_str("<!DOCTYPE rfc SYSTEM \"rfc2629.dtd\" [\n");
    for reference in canonical {
        if let Some(number) = reference.resolved_id.rfc_number() {
            out.push_str(&format!(
                "<!ENTITY {} SYSTEM \"{}/reference.RFC.{}.xml\">\n",
                reference.resolved_id.as_str(),
                options.bibxml_url,
                number
            ));
        }
    }
    out.push_str("]>\n");
}

fn encode_middle(out: &mut String, events: &[OutlineEvent]) {
    out.push_str("<middle>\n");
    for event in events {
        match event {
            OutlineEvent::Open(section) => out.push_str(&format!(
                "<section title=\"{}\"> <!-- {}, line {} -->\n",
                escape_attribute(&section.title),
                section.id,
                section.start_line
            )),
            OutlineEvent::Close(section) => out.push_str(&format!(
                "</section> <!-- ends: {} from line {} -->\n",
                section.id, section.start_line
            )),
            OutlineEvent::Paragraph(paragraph) => {
                out.push_str("<t>");
                out.push_str(&paragraph.lines.join("\n"));
                out.push_str("</t>\n");
            }
        }
    }
    out.push_str("</middle>\n");
}

fn encode_back(out: &mut String, index: &ReferenceIndex) {
    out.push_str("<back>\n");
    if !index.is_empty() {
        out.push_str("<references title=\"References\">\n");
        let mut seen = HashSet::new();
        for reference in index.iter() {
            if !reference.resolved_id.is_canonical() {
                encode_stub_reference(out, reference);
            } else if seen.insert(reference.resolved_id.as_str()) {
                out.push_str(&format!("&{};\n", reference.resolved_id.as_str()));
            }
        }
        out.push_str("</references>\n");
    }
    out.push_str("</back>\n");
}

/// Inline reference for a record without a canonical identifier.
fn encode_stub_reference(out: &mut String, reference: &Reference) {
    out.push_str(&format!(
        "<reference anchor=\"{}\">\n",
        reference.resolved_id.as_str()
    ));
    out.push_str("  <front>\n");
    out.push_str(&format!(
        "    <title>{}</title>\n",
        escape_text(&reference.text)
    ));
    out.push_str("    <author />\n");
    out.push_str("    <date />\n");
    out.push_str("  </front>\n");
    out.push_str("</reference>\n");
}

/// `--` may not appear inside an XML comment, and character references are
/// not expanded there, so non-ASCII characters become `?`.
fn comment_safe(text: &str) -> String {
    text.replace("--", "- -")
        .chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}
