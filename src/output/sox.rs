// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for getting sound to play using a sox subprocess.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};

use super::PcmSink;
use crate::wave::Pcm;

pub enum SoxTarget<'a> {
    /// Play on the default speakers using `play`.
    Play,
    /// Write to a file in any format sox supports, chosen by the extension.
    File(&'a Path),
}

pub struct SoxSink<'a> {
    target: SoxTarget<'a>,
}

impl<'a> SoxSink<'a> {
    pub fn new(target: SoxTarget<'a>) -> Self {
        Self { target }
    }

    /// Arguments describing the raw audio piped into sox.
    fn input_args(sample_rate: u32) -> Vec<String> {
        vec![
            "-R".into(), // make the output reproducible
            "--channels".into(),
            "1".into(),
            "--rate".into(),
            sample_rate.to_string(),
            "--type".into(),
            "s16".into(),
            "--endian".into(),
            "little".into(),
            "/dev/stdin".into(),
        ]
    }

    fn binaries() -> (PathBuf, PathBuf) {
        // For properly recording the sox dependency on nix:
        if let Some(sox_bin) = option_env!("NIX_SOX_BIN") {
            debug!("using sox from nix store {}", sox_bin);
            (Path::new(sox_bin).join("play"), Path::new(sox_bin).join("sox"))
        } else {
            ("play".into(), "sox".into())
        }
    }
}

impl<'a> PcmSink for SoxSink<'a> {
    fn consume(&mut self, pcm: &Pcm) -> io::Result<()> {
        let (play, sox) = Self::binaries();
        let input_args = Self::input_args(pcm.sample_rate());

        let mut command = match self.target {
            SoxTarget::Play => {
                info!("playing {:.2} seconds of audio", pcm.duration_seconds());
                let mut command = Command::new(&play);
                command
                    .args(&input_args)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null());
                command
            }
            SoxTarget::File(outfile) => {
                info!("writing {}", outfile.display());
                let mut command = Command::new(&sox);
                command.args(&input_args).arg(outfile);
                command
            }
        };
        let mut player = command.stdin(Stdio::piped()).spawn()?;

        let result = match player.stdin.take() {
            Some(mut audio_stream) => audio_stream
                .write_all(&pcm.to_le_bytes())
                .and_then(|_| audio_stream.flush()),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "sox did not open its input stream",
            )),
        };
        // sox exits on its own once the input stream is closed,
        // which happened when `audio_stream` was dropped.
        let status = player.wait()?;
        result?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("sox exited with {}", status),
            ))
        }
    }
}
