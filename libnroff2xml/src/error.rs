//! Error types for nroff conversion.

use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion context carrying the source name for error reporting.
#[derive(Clone, Debug)]
pub struct ConvertContext {
    pub filename: Option<String>,
}

impl ConvertContext {
    /// Create a new conversion context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a file suffix for error messages.
    pub fn file_suffix(&self) -> String {
        match &self.filename {
            Some(name) => format!(" in <{}>", name),
            None => String::new(),
        }
    }
}

/// Error type for nroff conversion.
///
/// Only structural failures surface here. Malformed reference records and
/// unresolvable citations degrade silently instead.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A heading tried to nest more than one level below the open section.
    #[error(
        "Illegal nesting jump at line {line}: current section depth is {depth}, \
         but \"{text}\" looks like level {level}; section levels can only increase by one{suffix}"
    )]
    IllegalNestingJump {
        line: usize,
        depth: usize,
        level: usize,
        text: String,
        suffix: String,
    },

    /// A section close was requested while no section was open.
    #[error("No open section to close at line {line}{suffix}")]
    EmptySectionStack { line: usize, suffix: String },
}

impl ConvertError {
    /// Attach the source file name from the context.
    pub fn in_file(self, ctx: &ConvertContext) -> Self {
        let suffix = ctx.file_suffix();
        match self {
            ConvertError::IllegalNestingJump {
                line,
                depth,
                level,
                text,
                ..
            } => ConvertError::IllegalNestingJump {
                line,
                depth,
                level,
                text,
                suffix,
            },
            ConvertError::EmptySectionStack { line, .. } => {
                ConvertError::EmptySectionStack { line, suffix }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_jump_message() {
        let err = ConvertError::IllegalNestingJump {
            line: 12,
            depth: 1,
            level: 3,
            text: "1.1.1. Deep".to_string(),
            suffix: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Illegal nesting jump at line 12: current section depth is 1, \
             but \"1.1.1. Deep\" looks like level 3; section levels can only increase by one"
        );
    }

    #[test]
    fn test_in_file_adds_suffix() {
        let ctx = ConvertContext::new(Some("draft-foo-00.nroff"));
        let err = ConvertError::EmptySectionStack {
            line: 4,
            suffix: String::new(),
        }
        .in_file(&ctx);
        assert!(matches!(err, ConvertError::EmptySectionStack { line: 4, .. }));
        assert_eq!(
            err.to_string(),
            "No open section to close at line 4 in <draft-foo-00.nroff>"
        );
    }
}
