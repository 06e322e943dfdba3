// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Errors that stop the pipeline.
//! Problems with individual lines are reported as [`Diagnostic`](crate::diagnostic::Diagnostic)s instead.

use std::io;
use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum ScoreError {
    #[snafu(display("No valid tracks found!"))]
    NoTracks,
    #[snafu(display("The score does not contain any notes"))]
    NoNotes,
    #[snafu(display("Could not read score {}: {}", path.display(), source))]
    ReadScore { path: PathBuf, source: io::Error },
    #[snafu(display("Could not dump score to {}: {}", path.display(), source))]
    DumpScore { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to allocate a buffer of {} samples", samples))]
    BufferAllocation { samples: usize },
    #[snafu(display("Failed to play audio: {}", source))]
    Playback { source: io::Error },
}
