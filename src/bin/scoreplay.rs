// syn.score -- plain text scores rendered to sound
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `scoreplay` - renders a plain text score and plays it with sox.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use structopt::StructOpt;

use syn_score::output::sox::{SoxSink, SoxTarget};
use syn_score::synth::SynthParams;
use syn_score::{output, parser, ScoreError};

#[derive(Debug, StructOpt)]
#[structopt(name = "scoreplay", about = "Playing plain text scores")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// The score file.
    #[structopt(parse(from_os_str))]
    source: PathBuf,

    /// Output file (any sox-supported format). The score is played directly if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Dump the parsed score before playing it.
    #[structopt(long)]
    #[allow(clippy::option_option)]
    dump_score: Option<Option<PathBuf>>,
}

fn main() {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("could not initialize logging: {}", err);
    }

    if let Err(err) = run(&opt) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), ScoreError> {
    let parsed = parser::parse_file(&opt.source)?;
    for diagnostic in &parsed.diagnostics {
        eprintln!("{}", diagnostic);
    }

    let dump_out = opt
        .dump_score
        .clone()
        .map(|path| path.unwrap_or_else(|| "/dev/stdout".into()));
    if let Some(path) = dump_out {
        std::fs::File::create(&path)
            .and_then(|mut f| writeln!(f, "{:#?}", parsed.score))
            .map_err(|source| ScoreError::DumpScore { path, source })?;
    }

    let target = match &opt.output {
        None => SoxTarget::Play,
        Some(path) => SoxTarget::File(path),
    };
    output::play(
        &parsed.score,
        &SynthParams::default(),
        &mut SoxSink::new(target),
    )
}
