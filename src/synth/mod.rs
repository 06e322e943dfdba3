// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This namespace contains all the parts converting from note data to wave data.

pub mod oscillator;

use log::{debug, info};

use crate::error::ScoreError;
use crate::score::{Note, Score};
use crate::wave::Pcm;
use oscillator::Oscillator;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Fraction of the full 16 bit range used by a single note.
pub const DEFAULT_GAIN: f64 = 0.2;

/// When overlapping notes are clamped to the 16 bit range.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ClipMode {
    /// Clamp the sample after adding each note's contribution.
    /// Once a sample hit the rail, later contributions start from there.
    PerContribution,
    /// Sum all contributions first and clamp the total once.
    Final,
}

/// Parameters of the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    /// Samples per second of the generated audio signal.
    pub sample_rate: u32,
    /// Peak amplitude of a single note relative to `i16::MAX`.
    pub gain: f64,
    pub clip: ClipMode,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            gain: DEFAULT_GAIN,
            clip: ClipMode::PerContribution,
        }
    }
}

impl SynthParams {
    /// Peak amplitude of a single note in sample units.
    pub fn amplitude(&self) -> f64 {
        i16::MAX as f64 * self.gain
    }

    /// Convert milliseconds to a sample count, truncating towards zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use syn_score::synth::SynthParams;
    /// let params = SynthParams::default();
    /// assert_eq!(params.ms_to_samples(100.0), 4410);
    /// assert_eq!(params.ms_to_samples(0.03), 1);
    /// assert_eq!(params.ms_to_samples(0.02), 0);
    /// ```
    pub fn ms_to_samples(&self, ms: f64) -> usize {
        (ms * self.sample_rate as f64 / 1000.0) as usize
    }
}

/// Number of samples needed to hold the whole score.
pub fn buffer_len(score: &Score, params: &SynthParams) -> usize {
    params.ms_to_samples(score.end_time_ms())
}

/// Render every note of the score as a sine tone and mix all of them into one buffer.
///
/// Samples of a note that would fall past the end of the buffer are dropped.
/// Fails if the buffer for the whole score cannot be allocated.
pub fn render(score: &Score, params: &SynthParams) -> Result<Pcm, ScoreError> {
    let len = buffer_len(score, params);
    info!(
        "rendering {} notes in {} tracks at {} Hz",
        score.note_count(),
        score.len(),
        params.sample_rate
    );
    info!(
        "total length {} samples ({:.2} seconds)",
        len,
        len as f64 / params.sample_rate as f64
    );

    let samples = match params.clip {
        ClipMode::PerContribution => {
            let mut buffer = zeroed_buffer::<i16>(len)?;
            for_each_contribution(score, params, len, |index, value| {
                buffer[index] = buffer[index].saturating_add(value);
            });
            buffer
        }
        ClipMode::Final => {
            let mut sums = zeroed_buffer::<i64>(len)?;
            for_each_contribution(score, params, len, |index, value| {
                sums[index] += i64::from(value);
            });
            sums.into_iter()
                .map(|sum| sum.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16)
                .collect()
        }
    };
    Ok(Pcm::new(samples, params.sample_rate))
}

fn zeroed_buffer<T: Clone + Default>(len: usize) -> Result<Vec<T>, ScoreError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| ScoreError::BufferAllocation { samples: len })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

/// Calls `mix` with the buffer index and value of every sample of every note.
fn for_each_contribution<F: FnMut(usize, i16)>(
    score: &Score,
    params: &SynthParams,
    len: usize,
    mut mix: F,
) {
    for track in score.iter() {
        debug!("rendering track {:?}", track.name());
        for (start_ms, note) in track.timed_notes() {
            render_note(start_ms, note, params, len, &mut mix);
        }
    }
}

fn render_note<F: FnMut(usize, i16)>(
    start_ms: f64,
    note: &Note,
    params: &SynthParams,
    len: usize,
    mix: &mut F,
) {
    let start_sample = params.ms_to_samples(start_ms);
    let duration_samples = params.ms_to_samples(note.duration as f64);
    let oscillator = Oscillator::new(
        params.sample_rate as f64,
        note.frequency,
        params.amplitude(),
    );
    for (offset, value) in oscillator.take(duration_samples).enumerate() {
        let index = start_sample + offset;
        if index >= len {
            break;
        }
        mix(index, value);
    }
}
