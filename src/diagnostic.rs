// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Recoverable problems found while parsing a score.
//!
//! The parser never stops at a bad line. It records a [`Diagnostic`] naming the line,
//! skips it and carries on in its current state.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

use snafu::Snafu;

/// The three fields of a note entry, in the order they are written.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NoteField {
    DeltaTime,
    Frequency,
    Duration,
}

impl fmt::Display for NoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteField::DeltaTime => write!(f, "delta time"),
            NoteField::Frequency => write!(f, "frequency"),
            NoteField::Duration => write!(f, "duration"),
        }
    }
}

/// Why the fields of a note entry could not be read.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum NoteFieldError {
    #[snafu(display("missing {}", field))]
    MissingField { field: NoteField },
    #[snafu(display("invalid {} {:?}: {}", field, token, source))]
    InvalidInt {
        field: NoteField,
        token: String,
        source: ParseIntError,
    },
    #[snafu(display("invalid {} {:?}: {}", field, token, source))]
    InvalidFloat {
        field: NoteField,
        token: String,
        source: ParseFloatError,
    },
    #[snafu(display("{} {} exceeds the maximum of {} ms", field, value, max))]
    OutOfRange { field: NoteField, value: u64, max: u64 },
    #[snafu(display("frequency must be a positive number, got {}", value))]
    InvalidFrequency { value: f64 },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Severity {
    /// The offending line was skipped.
    Error,
    /// The input was understood, but something was dropped.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum DiagnosticKind {
    #[snafu(display("Syntax error: Missing '{{' in track definition"))]
    MissingOpenBrace,
    #[snafu(display("Syntax error: Missing track name"))]
    MissingTrackName,
    #[snafu(display("Invalid note format"))]
    InvalidNoteFormat,
    #[snafu(display("Failed to parse note: missing ']'"))]
    MissingCloseBracket,
    #[snafu(display("Failed to parse note: {}", source))]
    MalformedNote { source: NoteFieldError },
    #[snafu(display("Track {} has no notes. Skipping.", name))]
    EmptyTrack { name: String },
    #[snafu(display("Note outside of any track. Skipping."))]
    NoteOutsideTrack,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::EmptyTrack { .. } | DiagnosticKind::NoteOutsideTrack => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

/// A problem tied to a single line of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Line number, starting at 1
    line: usize,
    /// The line with surrounding whitespace removed.
    text: String,
    kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new<S: Into<String>>(line: usize, text: S, kind: DiagnosticKind) -> Self {
        Self {
            line,
            text: text.into(),
            kind,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &DiagnosticKind {
        &self.kind
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// # Examples
///
/// ```
/// # use syn_score::diagnostic::*;
/// let diag = Diagnostic::new(3, "foo", DiagnosticKind::InvalidNoteFormat);
/// assert_eq!(diag.to_string(), "error: line 3: Invalid note format: foo");
/// ```
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: line {}: {}: {}",
            self.severity(),
            self.line,
            self.kind,
            self.text
        )
    }
}
