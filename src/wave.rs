// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

/// Mono, signed 16 bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcm {
    samples: Vec<i16>,
    /// Number of samples per second.
    sample_rate: u32,
}

impl Pcm {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// # Examples
    ///
    /// ```
    /// # use syn_score::wave::Pcm;
    /// assert_eq!(Pcm::new(vec![0; 22050], 44100).duration_seconds(), 0.5);
    /// ```
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn byte_len(&self) -> usize {
        self.samples.len() * std::mem::size_of::<i16>()
    }

    /// Copy the samples to bytes in little endian order.
    ///
    /// Returns the number of samples that were actually copied.
    /// Might be less than the number of samples if the output buffer was not large enough.
    pub fn copy_bytes_to(&self, bytes: &mut [u8]) -> usize {
        let mut processed = 0;
        for (sample, target) in self.samples.iter().zip(bytes.chunks_exact_mut(2)) {
            target.copy_from_slice(&sample.to_le_bytes());
            processed += 1;
        }
        processed
    }

    /// # Examples
    ///
    /// ```
    /// # use syn_score::wave::Pcm;
    /// let pcm = Pcm::new(vec![1, -2, 256], 44100);
    /// assert_eq!(pcm.to_le_bytes(), vec![1, 0, 0xfe, 0xff, 0, 1]);
    /// ```
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; self.byte_len()];
        self.copy_bytes_to(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn copy_into_short_buffer() {
        let pcm = Pcm::new(vec![i16::MAX, i16::MIN, 7], 8000);
        let mut bytes = [0u8; 5];
        assert_eq!(pcm.copy_bytes_to(&mut bytes), 2);
        assert_eq!(bytes, [0xff, 0x7f, 0x00, 0x80, 0]);
    }
}
