use std::path::PathBuf;
use thiserror::Error;

use crate::job::JobId;

/// Crate-wide error type.
///
/// Mirrors the four error kinds the heuristics and their surrounding tooling
/// can produce: malformed input, missing configuration, an unplaceable job
/// set, and an invariant violated by a schedule the heuristic itself
/// produced (always a bug, never a recoverable condition).
#[derive(Debug, Error)]
pub enum NpSchedError {
    #[error("{path}:{row}: malformed task-set row: {reason}")]
    InputMalformed {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("{path}: no core count given on the command line and none found in the filename")]
    MissingConfiguration { path: PathBuf },

    #[error("heuristic gave up with {unassigned} job(s) unplaced")]
    Unplaceable { unassigned: usize },

    #[error("schedule invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    #[error("duplicate job id {0} in input")]
    DuplicateJobId(JobId),

    #[error("precedence graph contains a cycle")]
    DagCycle,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The specific schedule invariant a failed post-run validation caught.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("core {core}: job {a} and job {b} overlap")]
    Overlap { core: u32, a: JobId, b: JobId },

    #[error("job {job} starts at {start}, before its release {release}")]
    StartsBeforeRelease {
        job: JobId,
        start: i64,
        release: i64,
    },

    #[error("job {job} finishes at {finish}, after its deadline {deadline}")]
    FinishesAfterDeadline {
        job: JobId,
        finish: i64,
        deadline: i64,
    },

    #[error("job {pred} must finish before successor {succ} starts, but finishes at {pred_finish} and successor starts at {succ_start}")]
    PrecedenceViolated {
        pred: JobId,
        succ: JobId,
        pred_finish: i64,
        succ_start: i64,
    },

    #[error("job {job} appears in both the schedule and the unassigned set")]
    DoubleCounted { job: JobId },

    #[error("job {job} from the input is missing from both the schedule and the unassigned set")]
    Missing { job: JobId },
}
