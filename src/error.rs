use serde::Serialize;
use std::fmt;

/// A recoverable compile diagnostic with an optional source range.
///
/// Ranges are byte offsets into the original template string and are only
/// present when `output_source_range` is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Warning {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into(), start: None, end: None }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}

/// Call-local diagnostic sink threaded through the whole pipeline.
///
/// Errors are blocking for the consumer, tips are advisory. Both lists keep
/// insertion order. When range tracking is on, every recorded offset is
/// shifted by `offset`, the number of characters trimmed from the front of
/// the template before parsing.
#[derive(Debug, Default)]
pub struct Warnings {
    pub errors: Vec<Warning>,
    pub tips: Vec<Warning>,
    with_ranges: bool,
    offset: usize,
}

impl Warnings {
    pub fn new(with_ranges: bool, offset: usize) -> Self {
        Self { errors: Vec::new(), tips: Vec::new(), with_ranges, offset }
    }

    pub fn warn(&mut self, msg: impl Into<String>, start: Option<usize>, end: Option<usize>) {
        let warning = self.build(msg, start, end);
        self.errors.push(warning);
    }

    pub fn tip(&mut self, msg: impl Into<String>, start: Option<usize>, end: Option<usize>) {
        let warning = self.build(msg, start, end);
        self.tips.push(warning);
    }

    fn build(&self, msg: impl Into<String>, start: Option<usize>, end: Option<usize>) -> Warning {
        let mut warning = Warning::new(msg);
        if self.with_ranges {
            warning.start = start.map(|s| s + self.offset);
            warning.end = end.map(|e| e + self.offset);
        }
        warning
    }
}

/// Kind of unrecoverable compile failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidForExpression,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidForExpression => "Invalid loop expression",
        }
    }
}

/// Hard failure: input whose control-flow syntax cannot be compiled at all.
///
/// Recoverable anomalies never construct this type; they degrade to
/// [`Warning`] entries on the returned result instead.
#[derive(Debug, Clone)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub start: usize,
    pub end: usize,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, start: usize, end: usize) -> Self {
        Self { kind, message: message.into(), start, end }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for CompileError {}

/// Unzips an attribute range into the pair [`Warnings::warn`] takes.
pub(crate) fn split_range(range: Option<(usize, usize)>) -> (Option<usize>, Option<usize>) {
    match range {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    }
}
