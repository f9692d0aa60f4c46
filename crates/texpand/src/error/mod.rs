//! Error handling
//!
//! Every failure in the engine is fatal for the current run and is surfaced as an [Error]
//!     through [VM::read](crate::vm::VM::read) and the other entry points.
//! An error has a [Kind], which describes what went wrong,
//!     the source location the engine had reached,
//!     the stack of macros that were being expanded,
//!     and free-form notes.
//! Its [Display](std::fmt::Display) implementation renders all of this for a terminal.

use crate::vm::source::Location;

mod display;
pub mod spellcheck;

/// The type of an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    #[error("undefined control sequence `\\{0}`")]
    UndefinedMacro(String),

    /// The literal text of a macro's pattern was not matched at the call site.
    #[error("use of `\\{0}` does not match its definition")]
    ArgumentMismatch(String),

    #[error("malformed parameter: {0}")]
    MalformedParameter(String),

    #[error("unbalanced group: {0}")]
    UnbalancedGroup(String),

    /// The input ended in the middle of an argument, a block or a conditional.
    #[error("unexpected end of input while {0}")]
    PrematureEndOfInput(String),

    #[error("input/output failure: {0}")]
    IoFailure(String),

    #[error("maximum expansion depth of {0} exceeded")]
    MaxExpansionDepthExceeded(usize),

    #[error("invalid character {0:?} in the input")]
    InvalidCharacter(char),

    #[error("control sequence name longer than {0} characters")]
    ControlSequenceTooLong(usize),

    #[error("more than {0} input sources are open")]
    InputStackOverflow(usize),

    #[error("{0}")]
    UnexpectedToken(String),
}

impl Kind {
    /// Short machine-friendly name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::UndefinedMacro(_) => "UndefinedMacro",
            Kind::ArgumentMismatch(_) => "ArgumentMismatch",
            Kind::MalformedParameter(_) => "MalformedParameter",
            Kind::UnbalancedGroup(_) => "UnbalancedGroup",
            Kind::PrematureEndOfInput(_) => "PrematureEndOfInput",
            Kind::IoFailure(_) => "IoFailure",
            Kind::MaxExpansionDepthExceeded(_) => "MaxExpansionDepthExceeded",
            Kind::InvalidCharacter(_) => "InvalidCharacter",
            Kind::ControlSequenceTooLong(_) => "ControlSequenceTooLong",
            Kind::InputStackOverflow(_) => "InputStackOverflow",
            Kind::UnexpectedToken(_) => "UnexpectedToken",
        }
    }
}

/// A fully located error.
#[derive(Debug)]
pub struct Error {
    pub kind: Kind,
    /// Where the engine was in the input when the error occurred.
    pub location: Option<Location>,
    /// Names of the macros being expanded, outermost first.
    pub stack_trace: Vec<String>,
    pub notes: Vec<String>,
}

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, Box<Error>>;

impl Error {
    /// Creates an error with no location.
    ///
    /// Within the engine, prefer [VM::error](crate::vm::VM::error) which fills in the location and stack trace.
    pub fn new(kind: Kind) -> Box<Error> {
        Box::new(Error {
            kind,
            location: None,
            stack_trace: vec![],
            notes: vec![],
        })
    }

    pub fn with_note<T: Into<String>>(mut self: Box<Self>, note: T) -> Box<Self> {
        self.notes.push(note.into());
        self
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns a plain summary of the error.
    pub fn summary(&self) -> Summary {
        Summary {
            kind: self.kind.name().to_string(),
            title: self.kind.to_string(),
            location: self.location.clone(),
            stack_trace: self.stack_trace.clone(),
            notes: self.notes.clone(),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display::format_error(f, self)
    }
}

/// Uncolored, serializable view of an [Error].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub kind: String,
    pub title: String,
    pub location: Option<Location>,
    pub stack_trace: Vec<String>,
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_messages() {
        assert_eq!(
            Kind::UndefinedMacro("foo".into()).to_string(),
            "undefined control sequence `\\foo`"
        );
        assert_eq!(
            Kind::InvalidCharacter('\x7F').to_string(),
            "invalid character '\\u{7f}' in the input"
        );
        assert_eq!(
            Kind::MaxExpansionDepthExceeded(10).to_string(),
            "maximum expansion depth of 10 exceeded"
        );
    }

    #[test]
    fn summary() {
        let err = Error::new(Kind::IoFailure("stream 3 is not open".into())).with_note("a note");
        let summary = err.summary();
        assert_eq!(summary.kind, "IoFailure");
        assert_eq!(summary.title, "input/output failure: stream 3 is not open");
        assert_eq!(summary.notes, vec!["a note".to_string()]);
        assert_eq!(summary.location, None);
    }
}
