//! Range parsing, grid enumeration and record output around the key engine.

use crate::eval::derive_key;
use crate::program::ProgramTable;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::debug;

/// Seeds evaluated per parallel batch before results are handed to the sink.
pub const SEED_CHUNK: u32 = 4096;

pub const ALGO_BOUNDS: &str = "[0x00:0xff]";
pub const SEED_BOUNDS: &str = "[0x0000:0xffff]";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("invalid hex value {0:?}")]
    InvalidHex(String),
    #[error("{what} should be in {bounds} range.")]
    OutOfRange {
        what: &'static str,
        bounds: &'static str,
    },
    #[error("empty range {lo:#x}:{hi:#x}")]
    EmptyRange { lo: u32, hi: u32 },
}

fn parse_hex(text: &str) -> Result<u32, ArgError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ArgError::InvalidHex(text.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| ArgError::InvalidHex(text.to_string()))
}

/// Parse `HEX` or `LO:HI` into an inclusive range capped at `max`.
fn parse_range(
    text: &str,
    max: u32,
    what: &'static str,
    bounds: &'static str,
) -> Result<RangeInclusive<u32>, ArgError> {
    let (lo, hi) = match text.split_once(':') {
        Some((lo, hi)) => (parse_hex(lo)?, parse_hex(hi)?),
        None => {
            let value = parse_hex(text)?;
            (value, value)
        }
    };
    if lo > max || hi > max {
        return Err(ArgError::OutOfRange { what, bounds });
    }
    if lo > hi {
        return Err(ArgError::EmptyRange { lo, hi });
    }
    Ok(lo..=hi)
}

pub fn parse_algo_range(text: &str) -> Result<RangeInclusive<u8>, ArgError> {
    let range = parse_range(text, u32::from(u8::MAX), "Algo", ALGO_BOUNDS)?;
    Ok(*range.start() as u8..=*range.end() as u8)
}

pub fn parse_seed_range(text: &str) -> Result<RangeInclusive<u16>, ArgError> {
    let range = parse_range(text, u32::from(u16::MAX), "Seed", SEED_BOUNDS)?;
    Ok(*range.start() as u16..=*range.end() as u16)
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    pub seed: u16,
    pub algo: u8,
    pub key: u16,
}

impl Record {
    pub fn compute(seed: u16, algo: u8, table: &ProgramTable) -> Self {
        Self {
            seed,
            algo,
            key: derive_key(seed, algo, table),
        }
    }

    pub fn write<W: Write>(&self, format: RecordFormat, out: &mut W) -> crate::Result<()> {
        match format {
            RecordFormat::Text => writeln!(out, "{self}")?,
            RecordFormat::Json => {
                serde_json::to_writer(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x} {:2x} {:04x}", self.seed, self.algo, self.key)
    }
}

/// The seed x algorithm grid to evaluate. Iteration is seed-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub seeds: RangeInclusive<u16>,
    pub algos: RangeInclusive<u8>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            seeds: 0..=u16::MAX,
            algos: 0..=u8::MAX,
        }
    }
}

impl Grid {
    pub fn new(seeds: RangeInclusive<u16>, algos: RangeInclusive<u8>) -> Self {
        Self { seeds, algos }
    }

    pub fn single(seed: u16, algo: u8) -> Self {
        Self::new(seed..=seed, algo..=algo)
    }

    pub fn is_single(&self) -> bool {
        self.seeds.start() == self.seeds.end() && self.algos.start() == self.algos.end()
    }

    fn seed_count(&self) -> u64 {
        u64::from(*self.seeds.end()) - u64::from(*self.seeds.start()) + 1
    }

    fn algo_count(&self) -> u64 {
        u64::from(*self.algos.end()) - u64::from(*self.algos.start()) + 1
    }

    pub fn len(&self) -> u64 {
        if self.seeds.is_empty() || self.algos.is_empty() {
            return 0;
        }
        self.seed_count() * self.algo_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records<'a>(&self, table: &'a ProgramTable) -> impl Iterator<Item = Record> + 'a {
        let algos = self.algos.clone();
        self.seeds.clone().flat_map(move |seed| {
            algos
                .clone()
                .map(move |algo| Record::compute(seed, algo, table))
        })
    }

    /// Evaluate the grid on `jobs` worker threads. Records reach `sink` in
    /// the same order as [`Grid::records`].
    pub fn evaluate_parallel<F>(&self, table: &ProgramTable, jobs: usize, mut sink: F) -> crate::Result<u64>
    where
        F: FnMut(&Record) -> crate::Result<()>,
    {
        if self.is_empty() {
            return Ok(0);
        }
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        let first = u32::from(*self.seeds.start());
        let end = u32::from(*self.seeds.end()) + 1;
        let mut emitted = 0u64;
        let mut lo = first;
        while lo < end {
            let hi = (lo + SEED_CHUNK).min(end);
            let batch: Vec<Vec<Record>> = pool.install(|| {
                (lo..hi)
                    .into_par_iter()
                    .map(|seed| {
                        self.algos
                            .clone()
                            .map(|algo| Record::compute(seed as u16, algo, table))
                            .collect::<Vec<Record>>()
                    })
                    .collect()
            });
            for record in batch.iter().flatten() {
                sink(record)?;
                emitted += 1;
            }
            lo = hi;
        }
        debug!(records = emitted, jobs, "parallel evaluation finished");
        Ok(emitted)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorError {
    #[error("line {line}: expected `algo seed key`, got {fields} field(s)")]
    FieldCount { line: usize, fields: usize },
    #[error("line {line}: {source}")]
    Field {
        line: usize,
        #[source]
        source: ArgError,
    },
}

/// A known-good `(algo, seed, key)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vector {
    pub algo: u8,
    pub seed: u16,
    pub key: u16,
}

impl Vector {
    /// Parse one hex triple per line. `#` starts a comment; commas and
    /// braces are treated as whitespace.
    pub fn parse_list(text: &str) -> Result<Vec<Vector>, VectorError> {
        let mut vectors = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let body = line.split('#').next().unwrap_or_default();
            let fields: Vec<&str> = body
                .split(|c: char| c.is_whitespace() || matches!(c, ',' | '{' | '}'))
                .filter(|f| !f.is_empty())
                .collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != 3 {
                return Err(VectorError::FieldCount {
                    line: line_no,
                    fields: fields.len(),
                });
            }
            vectors.push(Vector {
                algo: vector_field(fields[0], line_no, 0xFF, "Algo", ALGO_BOUNDS)? as u8,
                seed: vector_field(fields[1], line_no, 0xFFFF, "Seed", SEED_BOUNDS)? as u16,
                key: vector_field(fields[2], line_no, 0xFFFF, "Key", SEED_BOUNDS)? as u16,
            });
        }
        Ok(vectors)
    }
}

fn vector_field(
    text: &str,
    line: usize,
    max: u32,
    what: &'static str,
    bounds: &'static str,
) -> Result<u32, VectorError> {
    let value = parse_hex(text).map_err(|source| VectorError::Field { line, source })?;
    if value > max {
        return Err(VectorError::Field {
            line,
            source: ArgError::OutOfRange { what, bounds },
        });
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub vector: Vector,
    pub actual: u16,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key({:2x}, {:4x}) != {:4x}",
            self.vector.algo, self.vector.seed, self.vector.key
        )
    }
}

/// Run every vector against `table` and return the ones that disagree.
pub fn verify_vectors(vectors: &[Vector], table: &ProgramTable) -> Vec<Mismatch> {
    vectors
        .iter()
        .filter_map(|vector| {
            let actual = derive_key(vector.seed, vector.algo, table);
            (actual != vector.key).then_some(Mismatch {
                vector: *vector,
                actual,
            })
        })
        .collect()
}
