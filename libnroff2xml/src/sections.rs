//! Section nesting
//!
//! The section stack holds the chain of currently open sections, from the
//! top-level section down to the innermost one. A heading at level `n` closes
//! every open section at depth `n` or deeper before it opens, so closing order
//! is always stack order. A heading may open at most one level below the
//! innermost open section; anything deeper aborts the conversion.

use std::fmt;

use crate::error::{ConvertError, Result};

/// Dotted numeric section path such as `3.1.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionId(Vec<u32>);

impl SectionId {
    /// Deepest supported heading level.
    pub const MAX_DEPTH: usize = 4;

    /// Build a section id from its numeric components.
    ///
    /// Returns `None` for an empty path or one deeper than [`Self::MAX_DEPTH`].
    pub fn new(components: Vec<u32>) -> Option<Self> {
        if components.is_empty() || components.len() > Self::MAX_DEPTH {
            return None;
        }
        Some(Self(components))
    }

    /// Nesting level, equal to the number of components.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if `self` sits exactly one level below `parent` and
    /// shares its prefix.
    pub fn is_child_of(&self, parent: &SectionId) -> bool {
        self.0.len() == parent.0.len() + 1 && self.0.starts_with(&parent.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

/// A recognized heading: section path plus title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub id: SectionId,
    pub title: String,
}

impl Heading {
    pub fn level(&self) -> usize {
        self.id.depth()
    }
}

/// An open section on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    /// 1-based line of the heading that opened this section.
    pub start_line: usize,
}

/// Stack of open sections.
#[derive(Debug, Default)]
pub struct SectionStack {
    open: Vec<Section>,
}

impl SectionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open sections.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// The innermost open section.
    pub fn current(&self) -> Option<&Section> {
        self.open.last()
    }

    /// Open a section for `heading` found on line `line`.
    ///
    /// Returns the sections closed to make room for it, innermost first.
    /// `text` is the raw heading line, used only for diagnostics.
    pub fn open(&mut self, heading: Heading, line: usize, text: &str) -> Result<Vec<Section>> {
        let level = heading.level();
        let depth = self.depth();
        if level > depth + 1 {
            return Err(ConvertError::IllegalNestingJump {
                line,
                depth,
                level,
                text: text.trim_end().to_string(),
                suffix: String::new(),
            });
        }

        let mut closed = Vec::new();
        while self.depth() >= level {
            closed.push(self.close(line)?);
        }

        // The last section closed is the previous sibling, if any.
        if let Some(sibling) = closed.last() {
            if sibling.id == heading.id {
                log::warn!(
                    "Section {} in line {} repeats the number of the section started in line {}",
                    heading.id,
                    line,
                    sibling.start_line
                );
            }
        }
        if let Some(parent) = self.current() {
            if !heading.id.is_child_of(&parent.id) {
                log::warn!(
                    "Section {} in line {} is nested inside section {}",
                    heading.id,
                    line,
                    parent.id
                );
            }
        }

        log::info!(
            "Starting section {} ({}) in line {}.",
            heading.id,
            heading.title,
            line
        );
        self.open.push(Section {
            id: heading.id,
            title: heading.title,
            start_line: line,
        });
        Ok(closed)
    }

    /// Close the innermost open section.
    pub fn close(&mut self, line: usize) -> Result<Section> {
        let section = self.open.pop().ok_or(ConvertError::EmptySectionStack {
            line,
            suffix: String::new(),
        })?;
        log::info!(
            "Ending section {}, started in line {}.",
            section.id,
            section.start_line
        );
        Ok(section)
    }

    /// Close every open section, innermost first.
    pub fn close_all(&mut self, line: usize) -> Result<Vec<Section>> {
        let mut closed = Vec::with_capacity(self.open.len());
        while !self.open.is_empty() {
            closed.push(self.close(line)?);
        }
        Ok(closed)
    }
}
