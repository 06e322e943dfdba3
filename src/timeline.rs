// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Resolving relative note timing into absolute start times.

use crate::score::Note;

/// Compute the absolute start time in milliseconds of each note of a track.
///
/// The delta of a note is measured from the *end* of the previous note,
/// so notes of a single track never overlap.
///
/// # Examples
///
/// ```
/// # use syn_score::score::Note;
/// # use syn_score::timeline::start_times;
/// let notes = [Note::new(5, 440.0, 100), Note::new(0, 440.0, 20), Note::new(30, 440.0, 1)];
/// assert_eq!(start_times(&notes), vec![5.0, 105.0, 155.0]);
/// assert!(start_times(&[]).is_empty());
/// ```
pub fn start_times(notes: &[Note]) -> Vec<f64> {
    let mut starts = Vec::with_capacity(notes.len());
    let mut previous: Option<(f64, &Note)> = None;
    for note in notes {
        let start = match previous {
            None => note.delta_time as f64,
            Some((previous_start, previous_note)) => {
                let previous_end = previous_start + previous_note.duration as f64;
                previous_end + note.delta_time as f64
            }
        };
        starts.push(start);
        previous = Some((start, note));
    }
    starts
}
