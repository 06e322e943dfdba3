// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Structured description of a score: named tracks of timed notes.

use crate::error::ScoreError;
use crate::timeline;

/// A single sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Milliseconds between the end of the previous note in the same track
    /// and the start of this one.
    pub delta_time: u64,
    /// Pitch in Hz, always positive.
    pub frequency: f64,
    /// Length of the tone in milliseconds.
    pub duration: u64,
}

impl Note {
    pub fn new(delta_time: u64, frequency: f64, duration: u64) -> Self {
        Self {
            delta_time,
            frequency,
            duration,
        }
    }
}

/// A named sequence of notes with its own timeline.
///
/// The absolute start times are resolved once when the track is created,
/// there is exactly one start time for every note.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    name: String,
    notes: Vec<Note>,
    start_times_ms: Vec<f64>,
}

impl Track {
    /// Build a track from notes in playback order and resolve their start times.
    ///
    /// # Examples
    ///
    /// ```
    /// # use syn_score::score::*;
    /// let track = Track::new("lead", vec![Note::new(0, 440.0, 100), Note::new(50, 660.0, 100)]);
    /// assert_eq!(track.start_times_ms(), &[0.0, 150.0]);
    /// assert_eq!(track.end_time_ms(), 250.0);
    /// ```
    pub fn new<S: Into<String>>(name: S, notes: Vec<Note>) -> Self {
        let start_times_ms = timeline::start_times(&notes);
        Self {
            name: name.into(),
            notes,
            start_times_ms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Absolute start time of each note in milliseconds, parallel to `notes`.
    pub fn start_times_ms(&self) -> &[f64] {
        &self.start_times_ms
    }

    /// Iterate the notes together with their absolute start times.
    pub fn timed_notes(&self) -> impl Iterator<Item = (f64, &Note)> {
        self.start_times_ms.iter().copied().zip(self.notes.iter())
    }

    /// The time in milliseconds when the last note of this track stops sounding.
    pub fn end_time_ms(&self) -> f64 {
        self.timed_notes()
            .map(|(start, note)| start + note.duration as f64)
            .fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// All tracks of one input, in the order they appeared.
/// Track names are not required to be unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Score {
    tracks: Vec<Track>,
}

impl Score {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total number of notes over all tracks.
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Maximum end time over all notes of all tracks, zero for a silent score.
    pub fn end_time_ms(&self) -> f64 {
        self.tracks.iter().map(Track::end_time_ms).fold(0.0, f64::max)
    }

    /// Check whether there is anything to synthesize at all.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.tracks.is_empty() {
            Err(ScoreError::NoTracks)
        } else if self.note_count() == 0 {
            Err(ScoreError::NoNotes)
        } else {
            Ok(())
        }
    }
}
