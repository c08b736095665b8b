// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use color_eyre::eyre::{Context, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MIN_KEY: i64 = 0;
const MAX_KEY: i64 = 1_000_000_000;

/// Every `QUERY_EVERY`th command is a query, the others are insertions.
const QUERY_EVERY: usize = 5;

/// Number of the first file, each following file holds ten times the commands of the previous one.
const FIRST_FILE: u32 = 2;
const FIRST_FILE_COMMANDS: usize = 100;

/// Writes the command files `002.dat` up to `{last}.dat` into `out_dir`.
///
/// # Errors
///
/// Returns an error if `last` is below 2 or a file cannot be written.
pub fn generate(out_dir: &Path, seed: Option<u64>, last: u32) -> color_eyre::Result<()> {
    if last < FIRST_FILE {
        bail!("the last file number must be at least {FIRST_FILE}, got {last}");
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for n in FIRST_FILE..=last {
        let Some(commands) = 10_usize
            .checked_pow(n - FIRST_FILE)
            .and_then(|scale| scale.checked_mul(FIRST_FILE_COMMANDS))
        else {
            bail!("file {n:03}.dat would hold more commands than fit into memory");
        };
        let path = out_dir.join(format!("{n:03}.dat"));
        tracing::info!(path = %path.display(), commands, "generating");

        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write_commands(&mut out, &mut rng, commands)
            .and_then(|()| out.flush())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Writes `commands` random commands followed by a query over the whole key range.
///
/// Keys are drawn uniformly from `[0, 1_000_000_000]`, query bounds are ordered so every query
/// is valid.
///
/// # Errors
///
/// Returns any error of `out`.
pub fn write_commands<W: Write, R: Rng>(
    out: &mut W,
    rng: &mut R,
    commands: usize,
) -> io::Result<()> {
    for i in 0..commands {
        if i % QUERY_EVERY == 0 {
            let a = rng.random_range(MIN_KEY..=MAX_KEY);
            let b = rng.random_range(MIN_KEY..=MAX_KEY);
            write!(out, "q {} {} ", a.min(b), a.max(b))?;
        } else {
            write!(out, "k {} ", rng.random_range(MIN_KEY..=MAX_KEY))?;
        }
    }
    writeln!(out, "q {MIN_KEY} {MAX_KEY}")
}
