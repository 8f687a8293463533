use crate::program::{Program, ProgramStep, ProgramTable};
use serde::Serialize;
use tracing::trace;

/// Algorithm id that bypasses the table and returns the complemented seed.
pub const DEFAULT_ALGO: u8 = 0;

/// Derive the key for `seed` under algorithm `algo` of `table`.
pub fn derive_key(seed: u16, algo: u8, table: &ProgramTable) -> u16 {
    if algo == DEFAULT_ALGO {
        return !seed;
    }
    run_program(seed, &table.program(algo))
}

/// Run a four-step program over `seed`. Unknown opcodes pass the value through.
pub fn run_program(seed: u16, program: &Program) -> u16 {
    program.iter().fold(seed, |value, step| step.apply(value))
}

#[derive(Debug, Clone, Serialize)]
pub struct StepTrace {
    pub step: ProgramStep,
    pub before: u16,
    pub after: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyTrace {
    pub seed: u16,
    pub algo: u8,
    pub steps: Vec<StepTrace>,
    pub key: u16,
}

/// Same result as [`derive_key`], keeping the running value after every step.
pub fn trace_key(seed: u16, algo: u8, table: &ProgramTable) -> KeyTrace {
    if algo == DEFAULT_ALGO {
        return KeyTrace {
            seed,
            algo,
            steps: Vec::new(),
            key: !seed,
        };
    }
    let mut value = seed;
    let steps = table
        .program(algo)
        .into_iter()
        .map(|step| {
            let before = value;
            value = step.apply(value);
            trace!(
                op = %step.op,
                code = step.op.byte(),
                hh = step.hh,
                ll = step.ll,
                before,
                after = value,
                "step"
            );
            StepTrace {
                step,
                before,
                after: value,
            }
        })
        .collect();
    KeyTrace {
        seed,
        algo,
        steps,
        key: value,
    }
}
