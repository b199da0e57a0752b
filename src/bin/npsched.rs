//! CLI driver: loads task-set files, runs the chosen scheduling heuristic
//! over each job set, validates the result, and writes a schedule CSV (or a
//! failure marker) per `SPEC_FULL.md` §6.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info, instrument, warn};

use npsched::heuristics::{Heuristic, HeuristicFamily};
use npsched::loader;
use npsched::{validator, writer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HeuristicArg {
    Backfill,
    Feasint,
}

impl From<HeuristicArg> for HeuristicFamily {
    fn from(value: HeuristicArg) -> Self {
        match value {
            HeuristicArg::Backfill => HeuristicFamily::Backfill,
            HeuristicArg::Feasint => HeuristicFamily::Feasint,
        }
    }
}

/// Partitioned multiprocessor scheduling via backfill heuristics.
#[derive(Debug, Parser)]
#[command(name = "npsched", version, about)]
struct Cli {
    /// Input task-set files (*.csv).
    #[arg(required = true)]
    input_files: Vec<PathBuf>,

    /// Where to store the generated schedules.
    #[arg(short = 'o', long = "output-dir", default_value = "./Schedules")]
    output_dir: PathBuf,

    /// Number of cores to assume, if not inferable from the filename.
    #[arg(short = 'm', long = "number-of-cores")]
    number_of_cores: Option<u32>,

    /// Look only at one job-set index within each file (0-based).
    #[arg(short = 'i', long = "job-set-index")]
    job_set_index: Option<usize>,

    /// Which heuristic family to run.
    #[arg(long, value_enum)]
    heuristic: HeuristicArg,

    /// Write a `<name>-schedule.nosol` marker when the heuristic gives up.
    #[arg(short = 'f', long = "log-failures")]
    log_failures: bool,

    /// Log per-file wall-clock time spent in the PAF loop.
    #[arg(long)]
    profile: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating output directory {}", cli.output_dir.display()))
    {
        error!(error = %e, "could not create output directory");
        return ExitCode::FAILURE;
    }

    let mut fatal = false;
    for input_path in &cli.input_files {
        if let Err(fatal_err) = process_file(&cli, input_path) {
            error!(path = %input_path.display(), error = %fatal_err, "fatal invariant violation");
            fatal = true;
        }
    }

    if fatal {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Processes one input file. Returns `Err` only for a fatal invariant
/// violation; every other failure mode (malformed input, missing core
/// count, an unplaceable job set) is logged and absorbed so the remaining
/// files still get processed, matching §7's exit-code-0 policy.
#[instrument(skip(cli), fields(path = %input_path.display()))]
fn process_file(cli: &Cli, input_path: &PathBuf) -> Result<(), npsched::NpSchedError> {
    let jobsets = match loader::load_jobsets(input_path) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "skipping file: could not load task sets");
            return Ok(());
        }
    };

    let n_cores = cli.number_of_cores.or_else(|| loader::infer_core_count(input_path));
    let Some(n_cores) = n_cores else {
        let e = npsched::NpSchedError::MissingConfiguration {
            path: input_path.clone(),
        };
        warn!(error = %e, "skipping file");
        return Ok(());
    };

    for (idx, jobset) in jobsets.iter().enumerate() {
        if let Some(want) = cli.job_set_index {
            if want != idx {
                continue;
            }
        }

        info!(
            job_set_index = idx,
            n_jobs = jobset.jobs.len(),
            "scheduling job set"
        );

        let heuristic = Heuristic::resolve(cli.heuristic.into(), jobset.taskset.is_dag);
        let start = std::time::Instant::now();
        let result = match npsched::paf::run(heuristic, &jobset.jobs, n_cores) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping job set");
                continue;
            }
        };
        if cli.profile {
            info!(elapsed_ms = start.elapsed().as_millis(), "PAF loop finished");
        }

        let out_path = loader::schedule_output_path(&cli.output_dir, input_path, idx + 1);
        if result.unassigned.is_empty() {
            validator::validate(&jobset.jobs, &result.schedule, &result.unassigned)?;
            let file = fs::File::create(&out_path)?;
            writer::write_schedule(file, &jobset.jobs, &result.schedule)?;
            info!(out = %out_path.display(), "solution stored");
        } else {
            warn!(unplaced = result.unassigned.len(), "no solution found");
            if cli.log_failures {
                let marker = out_path.with_extension("nosol");
                fs::write(&marker, "no solution found")?;
            }
        }
    }

    Ok(())
}
