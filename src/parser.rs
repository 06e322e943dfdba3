// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Implements the line oriented parser for score files.
//!
//! A score consists of track blocks containing one note per line:
//!
//! ```text
//! # comment
//! track melody {
//!     [0, 440, 250]
//!     [50, 493.88, 250]
//! }
//! ```
//!
//! The fields of a note are the delta time in milliseconds (measured from the end of the
//! previous note), the frequency in Hz and the duration in milliseconds.
//! Commas between the fields are optional.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::{debug, trace};

use crate::diagnostic::{Diagnostic, DiagnosticKind, NoteField, NoteFieldError};
use crate::error::ScoreError;
use crate::score::{Note, Score, Track};

/// The token introducing a track block.
pub const TRACK_KEYWORD: &str = "track";

/// Largest delta time or duration in milliseconds a note may have.
pub const MAX_FIELD_MS: u64 = i32::MAX as u64;

/// Strip the spaces and tabs around a line.
///
/// # Examples
///
/// ```
/// # use syn_score::parser::normalize_line;
/// assert_eq!(normalize_line(" \t[0, 440, 100]  "), "[0, 440, 100]");
/// assert_eq!(normalize_line("\t \t"), "");
/// ```
pub fn normalize_line(line: &str) -> &str {
    line.trim_matches(|ch| ch == ' ' || ch == '\t')
}

/// Blank lines and `#` comments carry no content.
pub fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Result of parsing a complete input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parsed {
    /// All tracks that were closed with at least one note.
    pub score: Score,
    /// Everything that was skipped on the way, in input order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a score from a string.
///
/// # Examples
///
/// ```
/// # use syn_score::parser::parse_str;
/// let parsed = parse_str("track t {\n  [0, 440, 100]\n}\n");
/// assert!(parsed.diagnostics.is_empty());
/// assert_eq!(parsed.score.tracks()[0].name(), "t");
/// assert_eq!(parsed.score.tracks()[0].start_times_ms(), &[0.0]);
/// ```
pub fn parse_str(input: &str) -> Parsed {
    let mut parser = Parser::new();
    for line in input.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Parse a score line by line from a reader.
///
/// Bytes that are not valid UTF-8 are replaced by `U+FFFD` instead of failing the whole read,
/// so they only affect the line they appear in.
pub fn parse_reader<R: BufRead>(mut reader: R) -> io::Result<Parsed> {
    let mut parser = Parser::new();
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buffer);
        let line: &str = &decoded;
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        parser.feed_line(line);
    }
    Ok(parser.finish())
}

/// Parse the score file at `path`.
pub fn parse_file(path: &Path) -> Result<Parsed, ScoreError> {
    debug!("parsing {}", path.display());
    File::open(path)
        .and_then(|file| parse_reader(BufReader::new(file)))
        .map_err(|source| ScoreError::ReadScore {
            path: path.to_path_buf(),
            source,
        })
}

/// A track block whose closing brace was not seen yet.
#[derive(Debug)]
struct PendingTrack {
    name: String,
    notes: Vec<Note>,
}

#[derive(Debug)]
enum State {
    OutsideTrack,
    InsideTrack(PendingTrack),
}

/// Incremental score parser, fed one line at a time.
#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Number of the line that is currently processed, starting at 1
    line_number: usize,
    score: Score,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::OutsideTrack,
            line_number: 0,
            score: Score::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Process the next line of the input.
    pub fn feed_line(&mut self, raw_line: &str) {
        self.line_number += 1;
        let line = normalize_line(raw_line);
        if is_skippable(line) {
            return;
        }

        self.state = match std::mem::replace(&mut self.state, State::OutsideTrack) {
            State::OutsideTrack => self.outside_track(line),
            State::InsideTrack(pending) => self.inside_track(pending, line),
        };
    }

    /// Finish parsing. A track block that is still open at this point is dropped.
    pub fn finish(self) -> Parsed {
        if let State::InsideTrack(pending) = self.state {
            debug!(
                "dropping unterminated track {:?} with {} notes",
                pending.name,
                pending.notes.len()
            );
        }
        Parsed {
            score: self.score,
            diagnostics: self.diagnostics,
        }
    }

    fn outside_track(&mut self, line: &str) -> State {
        let header = match line.strip_prefix(TRACK_KEYWORD) {
            Some(header) => header,
            None => {
                if line.starts_with('[') {
                    self.report(line, DiagnosticKind::NoteOutsideTrack);
                } else {
                    trace!("line {}: ignoring {:?}", self.line_number, line);
                }
                return State::OutsideTrack;
            }
        };

        let brace = match header.find('{') {
            Some(brace) => brace,
            None => {
                self.report(line, DiagnosticKind::MissingOpenBrace);
                return State::OutsideTrack;
            }
        };

        let name = normalize_line(&header[..brace]);
        if name.is_empty() {
            self.report(line, DiagnosticKind::MissingTrackName);
            return State::OutsideTrack;
        }

        debug!("line {}: opening track {:?}", self.line_number, name);
        State::InsideTrack(PendingTrack {
            name: name.to_string(),
            notes: Vec::new(),
        })
    }

    fn inside_track(&mut self, mut pending: PendingTrack, line: &str) -> State {
        if line.contains('}') {
            self.close_track(pending, line);
            return State::OutsideTrack;
        }

        match parse_note(line) {
            Ok(note) => {
                trace!("line {}: {:?}", self.line_number, note);
                pending.notes.push(note);
            }
            Err(kind) => self.report(line, kind),
        }
        State::InsideTrack(pending)
    }

    fn close_track(&mut self, pending: PendingTrack, line: &str) {
        if pending.notes.is_empty() {
            self.report(line, DiagnosticKind::EmptyTrack { name: pending.name });
            return;
        }
        let track = Track::new(pending.name, pending.notes);
        debug!(
            "line {}: closing track {:?} with {} notes, ending at {} ms",
            self.line_number,
            track.name(),
            track.len(),
            track.end_time_ms()
        );
        self.score.push(track);
    }

    fn report(&mut self, line: &str, kind: DiagnosticKind) {
        let diagnostic = Diagnostic::new(self.line_number, line, kind);
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a single normalized note line of the form `[delta, frequency, duration]`.
///
/// Anything after the closing bracket is ignored, and so are additional fields.
///
/// # Examples
///
/// ```
/// # use syn_score::parser::parse_note;
/// # use syn_score::score::Note;
/// assert_eq!(parse_note("[10, 261.63, 500]"), Ok(Note::new(10, 261.63, 500)));
/// assert_eq!(parse_note("[0 4.4e2 100]"), Ok(Note::new(0, 440.0, 100)));
/// assert!(parse_note("[0, 440, 100").is_err());
/// ```
pub fn parse_note(line: &str) -> Result<Note, DiagnosticKind> {
    let body = line
        .strip_prefix('[')
        .ok_or(DiagnosticKind::InvalidNoteFormat)?;
    let end = body.find(']').ok_or(DiagnosticKind::MissingCloseBracket)?;
    let fields = body[..end].replace(',', " ");
    note_fields(&fields).map_err(|source| DiagnosticKind::MalformedNote { source })
}

fn note_fields(fields: &str) -> Result<Note, NoteFieldError> {
    let mut tokens = fields.split_whitespace();
    let delta_time = int_field(tokens.next(), NoteField::DeltaTime)?;
    let frequency = float_field(tokens.next(), NoteField::Frequency)?;
    let duration = int_field(tokens.next(), NoteField::Duration)?;

    if !(frequency > 0.0 && frequency.is_finite()) {
        return Err(NoteFieldError::InvalidFrequency { value: frequency });
    }
    Ok(Note::new(delta_time, frequency, duration))
}

fn int_field(token: Option<&str>, field: NoteField) -> Result<u64, NoteFieldError> {
    let token = token.ok_or(NoteFieldError::MissingField { field })?;
    let value: u64 = token.parse().map_err(|source| NoteFieldError::InvalidInt {
        field,
        token: token.to_string(),
        source,
    })?;
    if value > MAX_FIELD_MS {
        return Err(NoteFieldError::OutOfRange {
            field,
            value,
            max: MAX_FIELD_MS,
        });
    }
    Ok(value)
}

fn float_field(token: Option<&str>, field: NoteField) -> Result<f64, NoteFieldError> {
    let token = token.ok_or(NoteFieldError::MissingField { field })?;
    token.parse().map_err(|source| NoteFieldError::InvalidFloat {
        field,
        token: token.to_string(),
        source,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagnostic::Severity;
    use expect_test::{expect, Expect};

    fn check_diagnostics(input: &str, output: Expect) {
        let parsed = parse_str(input);
        let rendered: Vec<String> = parsed.diagnostics.iter().map(|d| d.to_string()).collect();
        output.assert_eq(&rendered.join("\n"));
    }

    #[test]
    fn single_note() {
        let parsed = parse_str(
            r"
            track t {
                [0, 440, 100]
            }",
        );
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.score.len(), 1);
        let track = &parsed.score.tracks()[0];
        assert_eq!(track.name(), "t");
        assert_eq!(track.notes(), &[Note::new(0, 440.0, 100)]);
        assert_eq!(track.start_times_ms(), &[0.0]);
    }

    #[test]
    fn several_tracks_keep_their_order() {
        let parsed = parse_str(
            r"
# intro
track melody {
    [0, 440, 100]
    [10 493.88 100]
    # a comment inside a track

    [0,523.25,200]
}
track melody {
	[250, 220, 50]
}
track bass line {
    [0, 110, 400]
}",
        );
        assert!(parsed.diagnostics.is_empty());
        let names: Vec<_> = parsed.score.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["melody", "melody", "bass line"]);
        assert_eq!(
            parsed.score.tracks()[0].start_times_ms(),
            &[0.0, 110.0, 210.0]
        );
        assert_eq!(parsed.score.tracks()[1].start_times_ms(), &[250.0]);
        assert_eq!(parsed.score.note_count(), 5);
    }

    #[test]
    fn malformed_note_drops_its_track() {
        let parsed = parse_str("track t {\n[1,2]\n}\n");
        assert!(parsed.score.is_empty());
        assert_eq!(parsed.diagnostics.len(), 2);
        assert_eq!(parsed.diagnostics[0].line(), 2);
        assert_eq!(
            parsed.diagnostics[0].kind(),
            &DiagnosticKind::MalformedNote {
                source: NoteFieldError::MissingField {
                    field: NoteField::Duration
                }
            }
        );
        assert_eq!(parsed.diagnostics[1].severity(), Severity::Warning);
    }

    #[test]
    fn reports_syntax_errors() {
        check_diagnostics(
            r"track missing brace
track {
}
track t {
    0, 440, 100
    [0, 440, 100
    [x, 440, 100]
    [0, loud, 100]
    [0, 440, -3]
    [0, -440, 100]
    [0, 440]
    [5, 440, 100]
}",
            expect![[r#"
                error: line 1: Syntax error: Missing '{' in track definition: track missing brace
                error: line 2: Syntax error: Missing track name: track {
                error: line 5: Invalid note format: 0, 440, 100
                error: line 6: Failed to parse note: missing ']': [0, 440, 100
                error: line 7: Failed to parse note: invalid delta time "x": invalid digit found in string: [x, 440, 100]
                error: line 8: Failed to parse note: invalid frequency "loud": invalid float literal: [0, loud, 100]
                error: line 9: Failed to parse note: invalid duration "-3": invalid digit found in string: [0, 440, -3]
                error: line 10: Failed to parse note: frequency must be a positive number, got -440: [0, -440, 100]
                error: line 11: Failed to parse note: missing duration: [0, 440]"#]],
        );
    }

    #[test]
    fn recovers_after_errors() {
        let parsed = parse_str(
            r"track broken
track t {
    garbage
    [5, 440, 100]
}",
        );
        assert_eq!(parsed.diagnostics.len(), 2);
        assert_eq!(parsed.score.len(), 1);
        assert_eq!(parsed.score.tracks()[0].start_times_ms(), &[5.0]);
    }

    #[test]
    fn empty_track_is_skipped() {
        check_diagnostics(
            "track quiet {\n}\ntrack loud {\n[0, 440, 10]\n}",
            expect![[r#"warning: line 2: Track quiet has no notes. Skipping.: }"#]],
        );
    }

    #[test]
    fn unterminated_track_is_dropped_silently() {
        let parsed = parse_str("track a {\n[0, 440, 100]\n[0, 440, 100]\n");
        assert!(parsed.score.is_empty());
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn no_leakage_between_blocks() {
        // the second header lacks a brace, so its notes are not part of any track
        let parsed = parse_str("track a {\n[0, 440, 100]\n}\ntrack b\n[0, 220, 100]\n}\n");
        assert_eq!(parsed.score.len(), 1);
        assert_eq!(parsed.score.tracks()[0].len(), 1);
        let kinds: Vec<_> = parsed.diagnostics.iter().map(|d| d.kind().clone()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::MissingOpenBrace,
                DiagnosticKind::NoteOutsideTrack
            ]
        );
    }

    #[test]
    fn notes_of_unnamed_track_are_reported() {
        check_diagnostics(
            "track {\n    [0, 440, 100]\n    [10, 220, 100]\n}\n",
            expect![[r#"
                error: line 1: Syntax error: Missing track name: track {
                warning: line 2: Note outside of any track. Skipping.: [0, 440, 100]
                warning: line 3: Note outside of any track. Skipping.: [10, 220, 100]"#]],
        );
    }

    #[test]
    fn note_fields_are_limited_to_int_range() {
        assert_eq!(
            parse_note("[2147483647, 440, 2147483647]"),
            Ok(Note::new(2147483647, 440.0, 2147483647))
        );
        check_diagnostics(
            r"track t {
    [0, 440, 2147483648]
    [0, 440, 18446744073709551615]
    [4294967296, 440, 1]
    [0, 440, 18446744073709551616]
}",
            expect![[r#"
                error: line 2: Failed to parse note: duration 2147483648 exceeds the maximum of 2147483647 ms: [0, 440, 2147483648]
                error: line 3: Failed to parse note: duration 18446744073709551615 exceeds the maximum of 2147483647 ms: [0, 440, 18446744073709551615]
                error: line 4: Failed to parse note: delta time 4294967296 exceeds the maximum of 2147483647 ms: [4294967296, 440, 1]
                error: line 5: Failed to parse note: invalid duration "18446744073709551616": number too large to fit in target type: [0, 440, 18446744073709551616]
                warning: line 6: Track t has no notes. Skipping.: }"#]],
        );
    }

    #[test]
    fn invalid_utf8_only_affects_its_line() {
        let parsed =
            parse_reader(&b"# caf\xe9\ntrack t {\n[0, 440\xff, 100]\n[0, 440, 100]\n}\n"[..])
                .unwrap();
        assert_eq!(parsed.score.len(), 1);
        assert_eq!(parsed.score.tracks()[0].notes(), &[Note::new(0, 440.0, 100)]);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].line(), 3);
        assert_eq!(parsed.diagnostics[0].text(), "[0, 440\u{fffd}, 100]");
        assert!(matches!(
            parsed.diagnostics[0].kind(),
            DiagnosticKind::MalformedNote {
                source: NoteFieldError::InvalidFloat {
                    field: NoteField::Frequency,
                    ..
                }
            }
        ));
    }

    #[test]
    fn reader_without_trailing_newline() {
        let parsed = parse_reader(&b"track t {\n[0, 440, 100]\n}"[..]).unwrap();
        assert_eq!(parsed.score.len(), 1);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn trailing_fields_and_text_are_ignored() {
        assert_eq!(
            parse_note("[1, 2.5, 3, 4] whatever"),
            Ok(Note::new(1, 2.5, 3))
        );
        assert_eq!(parse_note("[ +1 , 2 , 3 ]"), Ok(Note::new(1, 2.0, 3)));
    }

    #[test]
    fn empty_input() {
        let parsed = parse_str("");
        assert!(parsed.score.is_empty());
        assert!(parsed.diagnostics.is_empty());
        assert!(matches!(parsed.score.validate(), Err(ScoreError::NoTracks)));
    }

    #[test]
    fn parsing_is_repeatable() {
        let input = "track a {\n[0, 440, 100]\n[3, 880, 20]\n}\ntrack b {\n[7, 110, 5]\n}";
        assert_eq!(parse_str(input), parse_str(input));
    }

    #[test]
    fn reader_and_string_agree() {
        let input = "track a {\r\n\t[0, 440, 100]\r\n}\r\n";
        let from_reader = parse_reader(input.as_bytes()).unwrap();
        assert_eq!(from_reader, parse_str(input));
        assert_eq!(from_reader.score.len(), 1);
    }

    #[test]
    fn missing_file() {
        let result = parse_file(Path::new("/this/score/does/not/exist.txt"));
        assert!(matches!(result, Err(ScoreError::ReadScore { .. })));
    }
}
