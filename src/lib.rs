//! Seed-to-key calculator for the two-byte security access used by older GM
//! modules (GMLAN, Class 2 and friends).
//!
//! The engine is a tiny interpreter: every algorithm id selects a four-step
//! program out of a protocol table, and each step applies one of eleven
//! 16-bit primitives to the running seed.

pub mod driver;
pub mod eval;
pub mod ops;
pub mod program;
pub mod protocol;

pub use driver::{ArgError, Grid, Record, RecordFormat, Vector, VectorError};
pub use eval::{derive_key, run_program, trace_key, KeyTrace, StepTrace};
pub use ops::OpCode;
pub use program::{
    Program, ProgramStep, ProgramTable, ProgramTableBuilder, TableError, MIN_TABLE_LEN,
    STEPS_PER_PROGRAM, TABLE_STRIDE,
};
pub use protocol::Protocol;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("argument error: {0}")]
    Arg(#[from] ArgError),
    #[error("vector error: {0}")]
    Vector(#[from] VectorError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("serialize error: {0}")]
    Serde(#[from] serde_json::Error),
}
