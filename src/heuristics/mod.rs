//! The four scheduling variants and the dispatcher [`run_phase`] the PAF
//! meta-heuristic drives them through.

pub mod backfill_simple;
pub mod dagfeasint;
pub mod dagfill;
pub mod feasint;

use std::collections::HashSet;

use crate::error::NpSchedError;
use crate::job::{JobId, JobSpec, RunState};
use crate::schedule::Schedule;

/// Which of the four scheduling variants to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    BackfillSimple,
    Feasint,
    Dagfill,
    Dagfeasint,
}

/// The two CLI-selectable heuristic families (`--heuristic backfill` /
/// `--heuristic feasint`). The DAG-ness of the loaded task set picks which
/// precedence-aware sibling within the family actually runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicFamily {
    Backfill,
    Feasint,
}

impl Heuristic {
    pub fn resolve(family: HeuristicFamily, is_dag: bool) -> Self {
        match (family, is_dag) {
            (HeuristicFamily::Backfill, false) => Heuristic::BackfillSimple,
            (HeuristicFamily::Backfill, true) => Heuristic::Dagfill,
            (HeuristicFamily::Feasint, false) => Heuristic::Feasint,
            (HeuristicFamily::Feasint, true) => Heuristic::Dagfeasint,
        }
    }

    pub fn is_dag_aware(self) -> bool {
        matches!(self, Heuristic::Dagfill | Heuristic::Dagfeasint)
    }

    pub fn uses_feasibility_windows(self) -> bool {
        matches!(self, Heuristic::Feasint | Heuristic::Dagfeasint)
    }
}

/// Runs one phase of `heuristic` over `subset`. `later_jobs` are jobs not in
/// `subset` this phase whose windows/bounds must still be kept accurate for
/// a phase that will run after this one (empty when nothing follows).
/// Returns the ids in `subset` that could not be placed.
pub fn run_phase(
    heuristic: Heuristic,
    subset: &[JobId],
    later_jobs: &HashSet<JobId>,
    jobs: &[JobSpec],
    run: &mut RunState,
    schedule: &mut Schedule,
) -> Result<Vec<JobId>, NpSchedError> {
    match heuristic {
        Heuristic::BackfillSimple => backfill_simple::run(subset, jobs, schedule),
        Heuristic::Feasint => feasint::run(subset, later_jobs, jobs, run, schedule),
        Heuristic::Dagfill => dagfill::run(subset, later_jobs, jobs, run, schedule),
        Heuristic::Dagfeasint => dagfeasint::run(subset, later_jobs, jobs, run, schedule),
    }
}
