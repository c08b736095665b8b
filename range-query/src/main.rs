// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

mod generate;
mod logger;
mod protocol;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use avltree::AvlTree;
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use color_eyre::eyre::Context;

use crate::protocol::{Options, ProtocolError};

/// Helper for passing VERSION to opt.
/// If `CARGO_VERSION_INFO` is set, use it, otherwise use `CARGO_PKG_VERSION`.
fn version() -> &'static str {
    option_env!("CARGO_VERSION_INFO").unwrap_or(env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Parser)]
#[clap(version = version())]
struct Cli {
    #[clap(subcommand)]
    cmd: Cmd,
    /// Enables verbose logging
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Reads `k <key>` and `q <a> <b>` commands and prints the answer to every query
    Run {
        /// The command file to read, defaults to stdin.
        #[clap(value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        /// Answer queries with a `BTreeSet` instead of the AVL tree.
        #[clap(long, env = "RANGE_QUERY_BASELINE")]
        baseline: bool,
        /// Write a graphviz snapshot of the tree into this directory before every query.
        #[clap(long, env = "RANGE_QUERY_DOT_DIR", value_hint = ValueHint::DirPath)]
        dot: Option<PathBuf>,
    },
    /// Writes the benchmark command files `002.dat` to `007.dat`
    Generate {
        /// Number of the last file to write, each file holds ten times the commands of the
        /// previous one.
        #[clap(long, default_value_t = 7)]
        last: u32,
        /// Seed for the random number generator, random if omitted.
        #[clap(long)]
        seed: Option<u64>,
        /// Directory to write the files into.
        #[clap(long, default_value = ".", value_hint = ValueHint::DirPath)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("failed to install error report handler: {err}");
    }

    let cli = Cli::parse();
    logger::init(cli.verbose);

    match run(cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            match err.downcast_ref::<ProtocolError>() {
                Some(err) => ExitCode::from(err.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cmd: Cmd) -> color_eyre::Result<()> {
    match cmd {
        Cmd::Run {
            input,
            baseline,
            dot,
        } => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let opts = Options { dot_dir: dot };

            let res = match input {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    process(BufReader::new(file), &mut out, baseline, &opts)
                }
                None => process(io::stdin().lock(), &mut out, baseline, &opts),
            };

            // answers given before a protocol error are still part of the output
            out.flush().context("failed to flush output")?;
            res
        }
        Cmd::Generate { seed, out, last } => generate::generate(&out, seed, last),
    }
}

fn process(
    input: impl io::BufRead,
    out: &mut impl Write,
    baseline: bool,
    opts: &Options,
) -> color_eyre::Result<()> {
    let stats = if baseline {
        if opts.dot_dir.is_some() {
            tracing::warn!("the baseline set cannot be rendered, no snapshots will be written");
        }
        protocol::process(input, out, &mut BTreeSet::new(), opts)?
    } else {
        protocol::process(input, out, &mut AvlTree::new(), opts)?
    };

    tracing::info!(
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        queries = stats.queries,
        "processed input"
    );

    Ok(())
}
