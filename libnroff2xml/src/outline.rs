//! Pass 2: Outline
//!
//! A single forward scan that turns classified lines into a flat event
//! stream with explicit section open/close markers, in the spirit of an
//! indentation lexer:
//! - `Open`: a heading opened a section
//! - `Close`: a section ended (sibling, ancestor, or end of input)
//! - `Paragraph`: a finished paragraph block
//!
//! Every open and close first flushes the pending paragraph, so paragraphs
//! never straddle section boundaries. A nesting jump aborts the scan and no
//! events are returned.
//!
//! Inside the references region a record's own leading anchor stays literal.

use crate::citations::CitationExpander;
use crate::classify::{Classifier, LineKind};
use crate::error::Result;
use crate::paragraph::{Paragraph, ParagraphAccumulator};
use crate::references::{ReferenceIndex, Region};
use crate::scanner::SourceLine;
use crate::sections::{Heading, Section, SectionStack};

/// A structural event in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineEvent {
    Open(Section),
    Close(Section),
    Paragraph(Paragraph),
}

/// Build the outline of the manuscript.
pub fn build(lines: &[SourceLine<'_>], index: &ReferenceIndex) -> Result<Vec<OutlineEvent>> {
    let mut builder = OutlineBuilder::new(index);
    for line in lines {
        builder.line(line)?;
    }
    let last_line = lines.last().map_or(0, |line| line.line_num);
    builder.finish(last_line)
}

struct OutlineBuilder<'a> {
    classifier: Classifier,
    region: Option<Region>,
    stack: SectionStack,
    paragraphs: ParagraphAccumulator<'a>,
    events: Vec<OutlineEvent>,
}

impl<'a> OutlineBuilder<'a> {
    fn new(index: &'a ReferenceIndex) -> Self {
        Self {
            classifier: Classifier::new(),
            region: index.region(),
            stack: SectionStack::new(),
            paragraphs: ParagraphAccumulator::new(CitationExpander::new(index)),
            events: Vec::new(),
        }
    }

    fn line(&mut self, line: &SourceLine<'_>) -> Result<()> {
        let after_boundary = self.classifier.heading_expected();
        match self.classifier.classify(line.text) {
            LineKind::Skipped | LineKind::ControlMarker | LineKind::NestingBoundary => {}
            LineKind::TocStart => {
                log::info!("Table of contents starts in line {}.", line.line_num);
            }
            LineKind::Heading(heading) => {
                if !after_boundary {
                    log::debug!(
                        "Heading {} in line {} is not preceded by .ti 0",
                        heading.id,
                        line.line_num
                    );
                }
                self.open_section(heading, line)?;
            }
            LineKind::BodyText(text) => {
                let in_section = !self.stack.is_empty();
                let in_region = self
                    .region
                    .map_or(false, |region| region.contains(line.line_num));
                let finished = if in_region {
                    self.paragraphs.record_line(text, in_section)
                } else {
                    self.paragraphs.body_line(text, in_section)
                };
                if let Some(paragraph) = finished {
                    self.events.push(OutlineEvent::Paragraph(paragraph));
                }
            }
        }
        Ok(())
    }

    fn open_section(&mut self, heading: Heading, line: &SourceLine<'_>) -> Result<()> {
        let closed = self.stack.open(heading, line.line_num, line.text)?;
        self.flush_paragraph();
        self.events.extend(closed.into_iter().map(OutlineEvent::Close));
        if let Some(section) = self.stack.current() {
            self.events.push(OutlineEvent::Open(section.clone()));
        }
        Ok(())
    }

    fn flush_paragraph(&mut self) {
        if let Some(paragraph) = self.paragraphs.finish() {
            self.events.push(OutlineEvent::Paragraph(paragraph));
        }
    }

    fn finish(mut self, last_line: usize) -> Result<Vec<OutlineEvent>> {
        self.flush_paragraph();
        let closed = self.stack.close_all(last_line)?;
        self.events.extend(closed.into_iter().map(OutlineEvent::Close));
        Ok(self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::scanner::scan;

    fn outline(source: &str) -> Result<Vec<OutlineEvent>> {
        let lines = scan(source);
        let index = ReferenceIndex::build(&lines);
        build(&lines, &index)
    }

    /// Render events compactly: `+1`, `-1`, `p:first line|second line`.
    fn summary(events: &[OutlineEvent]) -> Vec<String> {
        events
            .iter()
            .map(|event| match event {
                OutlineEvent::Open(s) => format!("+{}", s.id),
                OutlineEvent::Close(s) => format!("-{}", s.id),
                OutlineEvent::Paragraph(p) => format!("p:{}", p.lines.join("|")),
            })
            .collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let source = "\
1. Introduction
Text here.

2. References
[1] A. Author, \"T\", RFC 1234, 2001.

A. Appendix";
        let events = outline(source).unwrap();
        assert_eq!(
            summary(&events),
            vec![
                "+1",
                "p:Text here.",
                "-1",
                "+2",
                "p:[1] A. Author, \"T\", RFC 1234, 2001.",
                "p:A. Appendix",
                "-2",
            ]
        );
        match &events[0] {
            OutlineEvent::Open(section) => {
                assert_eq!(section.title, "Introduction");
                assert_eq!(section.start_line, 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_paragraph_closed_by_heading() {
        let events = outline("1. A\nline one\nline two\n1.1. B\nbody\n").unwrap();
        assert_eq!(
            summary(&events),
            vec!["+1", "p:line one|line two", "+1.1", "p:body", "-1.1", "-1"]
        );
    }

    #[test]
    fn test_text_before_first_heading_is_dropped() {
        let events = outline("Network Working Group\n\nAbstract text\n\n1. Intro\nhi\n").unwrap();
        assert_eq!(summary(&events), vec!["+1", "p:hi", "-1"]);
    }

    #[test]
    fn test_balanced_nesting() {
        let source = "\
1. A
1.1. B
1.1.1. C
1.1.1.1. D
1.2. E
2. F
2.1. G
";
        let events = outline(source).unwrap();
        let opens = events
            .iter()
            .filter(|e| matches!(e, OutlineEvent::Open(_)))
            .count();
        let closes = events
            .iter()
            .filter(|e| matches!(e, OutlineEvent::Close(_)))
            .count();
        assert_eq!(opens, 7);
        assert_eq!(opens, closes);
        assert_eq!(
            summary(&events),
            vec![
                "+1", "+1.1", "+1.1.1", "+1.1.1.1", "-1.1.1.1", "-1.1.1", "-1.1", "+1.2", "-1.2",
                "-1", "+2", "+2.1", "-2.1", "-2",
            ]
        );
    }

    #[test]
    fn test_nesting_jump_aborts() {
        let err = outline("1. A\ntext\n1.1.1. C\nmore\n2. D\n").unwrap_err();
        match err {
            ConvertError::IllegalNestingJump {
                line, depth, level, ..
            } => {
                assert_eq!((line, depth, level), (3, 1, 3));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_toc_region_produces_nothing() {
        let source = "\
1. Status
ok

.ti 0
Table of Contents

.nf
   1. Status ....................................... 1
   2. Details ...................................... 2
   2.1.1.1. Would be an illegal jump ............... 3
Stray words
.fi
.ti 0
2. Details
body
";
        let events = outline(source).unwrap();
        assert_eq!(
            summary(&events),
            vec!["+1", "p:ok", "-1", "+2", "p:body", "-2"]
        );
    }

    #[test]
    fn test_control_lines_are_dropped() {
        let events = outline("1. A\n.in 3\nfirst\n.br\nsecond\n").unwrap();
        assert_eq!(summary(&events), vec!["+1", "p:first|second", "-1"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(outline("").unwrap().is_empty());
        assert!(outline("just text\n\nmore\n").unwrap().is_empty());
    }

    #[test]
    fn test_citation_before_definition() {
        let source = "\
1. Intro
As [RFC2119] says, and [X] too.

2. References

[RFC2119] Bradner, S., \"Key words\", BCP 14, RFC 2119, March 1997.
";
        let events = outline(source).unwrap();
        assert_eq!(
            summary(&events)[1],
            "p:As <xref target=\"RFC2119\"/> says, and [X] too."
        );
    }
}
