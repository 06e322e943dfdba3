// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Handing rendered audio to whatever plays or stores it.

pub mod sox;

use std::io;

use crate::error::ScoreError;
use crate::score::Score;
use crate::synth::{self, SynthParams};
use crate::wave::Pcm;

/// Consumer of a finished PCM buffer, e.g. the speakers or a file.
pub trait PcmSink {
    /// Play or store the audio, blocking until done.
    fn consume(&mut self, pcm: &Pcm) -> io::Result<()>;
}

/// Collects everything it receives, mostly useful for testing.
impl PcmSink for Vec<Pcm> {
    fn consume(&mut self, pcm: &Pcm) -> io::Result<()> {
        self.push(pcm.clone());
        Ok(())
    }
}

/// Synthesize a score and hand the audio to `sink`.
///
/// Nothing is rendered for a score without notes.
pub fn play<S: PcmSink + ?Sized>(
    score: &Score,
    params: &SynthParams,
    sink: &mut S,
) -> Result<(), ScoreError> {
    score.validate()?;
    let pcm = synth::render(score, params)?;
    sink.consume(&pcm).map_err(|source| ScoreError::Playback { source })
}
