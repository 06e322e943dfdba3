// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::f64::consts::PI;

/// A sine oscillator sampling a tone at a fixed sample rate.
///
/// The phase is zero at the first sample, so every note starts its own wave
/// independently of where it is placed in the song.
#[derive(Debug)]
pub struct Oscillator {
    sample_rate: f64,
    frequency: f64,
    amplitude: f64,
    /// Samples since the onset of the tone
    position: usize,
}

impl Oscillator {
    pub fn new(sample_rate: f64, frequency: f64, amplitude: f64) -> Self {
        Self {
            sample_rate,
            frequency,
            amplitude,
            position: 0,
        }
    }

    /// Value of the wave `offset` samples after the onset.
    pub fn sample_at(&self, offset: usize) -> f64 {
        let t = offset as f64 / self.sample_rate;
        (2.0 * PI * self.frequency * t).sin() * self.amplitude
    }
}

/// Yields the integer contribution of each successive sample, truncated towards zero.
impl Iterator for Oscillator {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        let value = self.sample_at(self.position);
        self.position += 1;
        Some(value as i16)
    }
}
