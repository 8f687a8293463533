use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use gm_seedkey::{
    driver::{parse_algo_range, parse_seed_range, verify_vectors},
    protocol::DEFAULT_TABLE_DIR,
    trace_key, Grid, ProgramTable, Protocol, RecordFormat, Vector,
};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, Level};

#[derive(Parser, Debug)]
#[command(
    name = "gm-seed-key",
    about = "Print key(s) for the provided algo, seed and protocol.",
    version
)]
struct Args {
    /// Algorithm to use: hex value in [00:ff] or a LO:HI range. All algos when omitted.
    #[arg(short, long, value_parser = parse_algo_range, default_value = "00:ff")]
    algo: RangeInclusive<u8>,

    /// Input seed: hex value in [0000:ffff] or a LO:HI range. All seeds when omitted.
    #[arg(short, long, value_parser = parse_seed_range, default_value = "0000:ffff")]
    seed: RangeInclusive<u16>,

    /// Protocol table to use.
    #[arg(short, long, value_enum, default_value_t = Protocol::Gmlan)]
    protocol: Protocol,

    /// Directory holding <protocol>.bin or <protocol>.hex tables.
    #[arg(long, value_name = "DIR", env = "GM_SEEDKEY_TABLE_DIR", default_value = DEFAULT_TABLE_DIR)]
    table_dir: PathBuf,

    /// Explicit table file; overrides --protocol and --table-dir.
    #[arg(long, value_name = "PATH")]
    table: Option<PathBuf>,

    /// Output record format.
    #[arg(long, value_enum, default_value_t = RecordFormat::Text)]
    format: RecordFormat,

    /// Worker threads for grid evaluation.
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Check `algo seed key` vectors from this file before enumerating.
    #[arg(long, value_name = "PATH")]
    verify: Option<PathBuf>,

    /// Show every program step for a single seed/algo pair.
    #[arg(long, action = ArgAction::SetTrue)]
    explain: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

fn load_table(args: &Args) -> Result<ProgramTable> {
    match &args.table {
        Some(path) => ProgramTable::load(path)
            .with_context(|| format!("loading table {}", path.display())),
        None => args
            .protocol
            .load_table(&args.table_dir)
            .with_context(|| format!("loading {} table", args.protocol)),
    }
}

fn explain<W: Write>(table: &ProgramTable, grid: &Grid, format: RecordFormat, out: &mut W) -> Result<()> {
    if !grid.is_single() {
        bail!("--explain needs a single --algo and a single --seed");
    }
    let trace = trace_key(*grid.seeds.start(), *grid.algos.start(), table);
    match format {
        RecordFormat::Json => {
            serde_json::to_writer(&mut *out, &trace)?;
            writeln!(out)?;
        }
        RecordFormat::Text => {
            if trace.steps.is_empty() {
                writeln!(out, "algo 00: complement, table not consulted")?;
            }
            for (index, step) in trace.steps.iter().enumerate() {
                writeln!(
                    out,
                    "step {index}: {:<5} {:02x} {:02x} {:02x}  {:04x} -> {:04x}",
                    step.step.op.mnemonic(),
                    step.step.op.byte(),
                    step.step.hh,
                    step.step.ll,
                    step.before,
                    step.after
                )?;
            }
            writeln!(out, "{:04x} {:2x} {:04x}", trace.seed, trace.algo, trace.key)?;
        }
    }
    Ok(())
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == io::ErrorKind::BrokenPipe)
    })
}

fn run(args: Args) -> Result<ExitCode> {
    let table = load_table(&args)?;
    let grid = Grid::new(args.seed.clone(), args.algo.clone());

    let mut failed = false;
    if let Some(path) = &args.verify {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading vectors {}", path.display()))?;
        let vectors = Vector::parse_list(&text)
            .with_context(|| format!("parsing vectors {}", path.display()))?;
        let mismatches = verify_vectors(&vectors, &table);
        for mismatch in &mismatches {
            eprintln!("{mismatch}");
        }
        info!(
            vectors = vectors.len(),
            mismatches = mismatches.len(),
            "verified conformance vectors"
        );
        failed = !mismatches.is_empty();
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.explain {
        explain(&table, &grid, args.format, &mut out)?;
    } else if args.jobs > 1 {
        grid.evaluate_parallel(&table, args.jobs, |record| record.write(args.format, &mut out))?;
    } else {
        let mut emitted = 0u64;
        for record in grid.records(&table) {
            record.write(args.format, &mut out)?;
            emitted += 1;
        }
        debug!(records = emitted, "enumeration finished");
    }
    out.flush()?;

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);
    debug!(?args, "starting");
    match run(args) {
        Err(err) if is_broken_pipe(&err) => Ok(ExitCode::SUCCESS),
        other => other,
    }
}
