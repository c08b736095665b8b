// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The command stream understood by `range-query run`.
//!
//! Input is a sequence of whitespace separated commands:
//!
//! - `k <key>` inserts `key`,
//! - `q <a> <b>` prints the number of inserted keys `k` with `a <= k <= b`, followed by a space.
//!
//! Once the input is exhausted a single newline terminates the output. A command is a single
//! character, so `k5` reads the same as `k 5`. Characters that are not a known command are skipped.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::{fmt, fs};

use avltree::AvlTree;
use color_eyre::eyre::Context;

/// A key is any integer the input can spell.
pub type Key = i64;

const INSERT: char = 'k';
const QUERY: char = 'q';

/// Exit code reported for malformed input.
const INPUT_ERROR: u8 = 2;

/// Malformed input that stops processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A query whose lower bound is larger than its upper bound.
    InvertedRange {
        first: Key,
        second: Key,
        line: usize,
    },
    /// The input ended before all operands of a command were read.
    MissingOperand { command: char, line: usize },
    /// An operand that is not an integer.
    InvalidKey { token: String, line: usize },
}

impl ProtocolError {
    /// The process exit code this error maps to.
    pub fn exit_code(&self) -> u8 {
        INPUT_ERROR
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvertedRange {
                first,
                second,
                line,
            } => write!(
                f,
                "line {line}: query range [{first}, {second}] has its bounds inverted"
            ),
            ProtocolError::MissingOperand { command, line } => {
                write!(f, "line {line}: `{command}` is missing an operand")
            }
            ProtocolError::InvalidKey { token, line } => {
                write!(f, "line {line}: `{token}` is not a valid key")
            }
        }
    }
}

impl core::error::Error for ProtocolError {}

/// An ordered set of keys that can answer range counting queries.
pub trait RangeSet {
    /// Inserts `key`, returning `false` if it was already present.
    fn insert(&mut self, key: Key) -> bool;

    /// Counts the keys within `[first, second]`.
    fn range_count(&self, first: Key, second: Key) -> usize;

    /// Renders the set in graphviz format, if it has a tree shape worth rendering.
    fn dot(&self) -> Option<String> {
        None
    }
}

impl RangeSet for AvlTree<Key> {
    fn insert(&mut self, key: Key) -> bool {
        AvlTree::insert(self, key).1
    }

    fn range_count(&self, first: Key, second: Key) -> usize {
        AvlTree::range_count(self, &first, &second)
    }

    fn dot(&self) -> Option<String> {
        Some(AvlTree::dot(self).to_string())
    }
}

impl RangeSet for BTreeSet<Key> {
    fn insert(&mut self, key: Key) -> bool {
        BTreeSet::insert(self, key)
    }

    fn range_count(&self, first: Key, second: Key) -> usize {
        if first > second {
            return 0;
        }
        self.range(first..=second).count()
    }
}

#[derive(Debug, Default)]
pub struct Options {
    /// Directory receiving a `treeNNN.dot` snapshot before every query.
    pub dot_dir: Option<PathBuf>,
}

/// Counters reported after a successful run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub inserted: usize,
    pub duplicates: usize,
    pub queries: usize,
}

/// Executes every command of `input` against `set` and writes the answers to `out`.
///
/// # Errors
///
/// Stops at the first malformed command with a [`ProtocolError`]. Answers to earlier queries
/// have been written to `out` by then, the terminating newline has not. I/O failures are returned
/// as well.
pub fn process<R, W, S>(
    input: R,
    out: &mut W,
    set: &mut S,
    opts: &Options,
) -> color_eyre::Result<Stats>
where
    R: BufRead,
    W: Write,
    S: RangeSet,
{
    let mut tokens = Tokens::new(input);
    let mut stats = Stats::default();

    while let Some(command) = tokens.next_command()? {
        match command {
            INSERT => {
                let key = tokens.operand(INSERT)?;
                if set.insert(key) {
                    stats.inserted += 1;
                } else {
                    tracing::trace!(key, "duplicate key");
                    stats.duplicates += 1;
                }
            }
            QUERY => {
                let first = tokens.operand(QUERY)?;
                let second = tokens.operand(QUERY)?;
                if first > second {
                    return Err(ProtocolError::InvertedRange {
                        first,
                        second,
                        line: tokens.line,
                    }
                    .into());
                }

                stats.queries += 1;
                if let Some(dir) = &opts.dot_dir {
                    snapshot(set, dir, stats.queries)?;
                }

                let count = set.range_count(first, second);
                tracing::debug!(first, second, count, "query");
                write!(out, "{count} ").context("failed to write answer")?;
            }
            other => tracing::debug!(line = tokens.line, "skipping unknown command `{other}`"),
        }
    }

    writeln!(out).context("failed to write answer")?;
    Ok(stats)
}

fn snapshot<S: RangeSet>(set: &S, dir: &std::path::Path, n: usize) -> color_eyre::Result<()> {
    let Some(dot) = set.dot() else {
        return Ok(());
    };

    let path = dir.join(format!("tree{n:03}.dot"));
    tracing::trace!(path = %path.display(), "writing snapshot");
    fs::write(&path, dot).with_context(|| format!("failed to write {}", path.display()))
}

/// Splits a reader into whitespace separated tokens, one line at a time.
struct Tokens<R> {
    reader: R,
    buf: String,
    pos: usize,
    /// 1-based number of the line in `buf`.
    line: usize,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            pos: 0,
            line: 0,
        }
    }

    /// Returns the byte range of the next token, reading further lines as needed.
    fn advance(&mut self) -> io::Result<Option<(usize, usize)>> {
        loop {
            let rest = &self.buf[self.pos..];
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() {
                let start = self.buf.len() - trimmed.len();
                let end = trimmed
                    .find(char::is_whitespace)
                    .map_or(self.buf.len(), |len| start + len);
                return Ok(Some((start, end)));
            }

            self.buf.clear();
            self.pos = 0;
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
        }
    }

    /// Consumes the first character of the next token.
    fn next_command(&mut self) -> color_eyre::Result<Option<char>> {
        let Some((start, _)) = self.advance().context("failed to read input")? else {
            return Ok(None);
        };
        let command = self.buf[start..].chars().next();
        self.pos = start + command.map_or(0, char::len_utf8);
        Ok(command)
    }

    /// Consumes the rest of the next token and parses it as a key.
    fn operand(&mut self, command: char) -> color_eyre::Result<Key> {
        let Some((start, end)) = self.advance().context("failed to read input")? else {
            return Err(ProtocolError::MissingOperand {
                command,
                line: self.line,
            }
            .into());
        };
        self.pos = end;

        let token = &self.buf[start..end];
        token.parse().map_err(|_| {
            ProtocolError::InvalidKey {
                token: token.to_owned(),
                line: self.line,
            }
            .into()
        })
    }
}
