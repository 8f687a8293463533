//! Program tables: the byte layout, its validation, and typed views over it.
//!
//! A table stores one 13-byte block per algorithm id. Each block holds four
//! `(opcode, hh, ll)` triples followed by one padding byte:
//!
//! ```text
//! table[algo * 13 + step * 3 + 0]  opcode
//! table[algo * 13 + step * 3 + 1]  hh
//! table[algo * 13 + step * 3 + 2]  ll
//! table[algo * 13 + 12]            unused
//! ```

use crate::ops::OpCode;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const STEPS_PER_PROGRAM: usize = 4;
pub const STEP_LEN: usize = 3;
pub const TABLE_STRIDE: usize = STEPS_PER_PROGRAM * STEP_LEN + 1;
/// Smallest table that still addresses the fourth step of algorithm 0xFF.
pub const MIN_TABLE_LEN: usize = 0xFF * TABLE_STRIDE + STEPS_PER_PROGRAM * STEP_LEN + 1;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table is {len} bytes, at least {required} are required")]
    TooShort { len: usize, required: usize },
    #[error("invalid hex byte {token:?} on line {line}")]
    InvalidHex { line: usize, token: String },
    #[error("no table for protocol {protocol} in {} (tried .bin and .hex)", dir.display())]
    NotFound { protocol: String, dir: PathBuf },
    #[error("failed to read table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgramStep {
    pub op: OpCode,
    pub hh: u8,
    pub ll: u8,
}

impl ProgramStep {
    pub fn new(op: OpCode, hh: u8, ll: u8) -> Self {
        Self { op, hh, ll }
    }

    fn from_triple(raw: &[u8]) -> Self {
        Self {
            op: OpCode::from_byte(raw[0]),
            hh: raw[1],
            ll: raw[2],
        }
    }

    pub fn apply(&self, value: u16) -> u16 {
        self.op.apply(value, self.hh, self.ll)
    }
}

pub type Program = [ProgramStep; STEPS_PER_PROGRAM];

/// Immutable opcode table for one protocol.
///
/// Construction checks the length contract, so lookups for any `u8`
/// algorithm id never leave the backing storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTable {
    bytes: Box<[u8]>,
}

impl ProgramTable {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, TableError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_TABLE_LEN {
            return Err(TableError::TooShort {
                len: bytes.len(),
                required: MIN_TABLE_LEN,
            });
        }
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Parse whitespace/comma separated hex bytes. `#` and `//` start a
    /// comment; braces and semicolons are ignored so a C initializer body
    /// can be pasted as-is.
    pub fn parse_hex(text: &str) -> Result<Self, TableError> {
        let mut bytes = Vec::with_capacity(MIN_TABLE_LEN);
        for (idx, line) in text.lines().enumerate() {
            let line = strip_comment(line);
            let tokens = line
                .split(|c: char| c.is_whitespace() || matches!(c, ',' | '{' | '}' | ';'))
                .filter(|t| !t.is_empty());
            for token in tokens {
                bytes.push(parse_hex_byte(token).ok_or_else(|| TableError::InvalidHex {
                    line: idx + 1,
                    token: token.to_string(),
                })?);
            }
        }
        Self::from_bytes(bytes)
    }

    /// Load a table from disk. Files ending in `.hex` are parsed as hex text,
    /// anything else is taken as raw bytes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let io_err = |source| TableError::Io {
            path: path.to_path_buf(),
            source,
        };
        let is_hex = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("hex"));
        let table = if is_hex {
            let text = fs::read_to_string(path).map_err(io_err)?;
            Self::parse_hex(&text)?
        } else {
            Self::from_bytes(fs::read(path).map_err(io_err)?)?
        };
        debug!(path = %path.display(), len = table.len(), hex = is_hex, "loaded program table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn step(&self, algo: u8, index: usize) -> ProgramStep {
        debug_assert!(index < STEPS_PER_PROGRAM);
        let offset = usize::from(algo) * TABLE_STRIDE + index * STEP_LEN;
        ProgramStep::from_triple(&self.bytes[offset..offset + STEP_LEN])
    }

    pub fn program(&self, algo: u8) -> Program {
        std::array::from_fn(|index| self.step(algo, index))
    }
}

fn strip_comment(line: &str) -> &str {
    let end = [line.find('#'), line.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

fn parse_hex_byte(token: &str) -> Option<u8> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

/// Assembles a table in memory, starting from an all-zero image where every
/// step is an unknown (identity) opcode.
#[derive(Debug, Clone)]
pub struct ProgramTableBuilder {
    bytes: Vec<u8>,
}

impl Default for ProgramTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramTableBuilder {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MIN_TABLE_LEN],
        }
    }

    pub fn step(mut self, algo: u8, index: usize, op: u8, hh: u8, ll: u8) -> Self {
        assert!(index < STEPS_PER_PROGRAM, "step index {index} out of range");
        let offset = usize::from(algo) * TABLE_STRIDE + index * STEP_LEN;
        self.bytes[offset..offset + STEP_LEN].copy_from_slice(&[op, hh, ll]);
        self
    }

    pub fn program(mut self, algo: u8, steps: [(u8, u8, u8); STEPS_PER_PROGRAM]) -> Self {
        for (index, (op, hh, ll)) in steps.into_iter().enumerate() {
            self = self.step(algo, index, op, hh, ll);
        }
        self
    }

    pub fn programs(
        mut self,
        programs: impl IntoIterator<Item = (u8, [(u8, u8, u8); STEPS_PER_PROGRAM])>,
    ) -> Self {
        for (algo, steps) in programs {
            self = self.program(algo, steps);
        }
        self
    }

    pub fn build(self) -> ProgramTable {
        ProgramTable {
            bytes: self.bytes.into_boxed_slice(),
        }
    }
}
