//! Score tuples driving job-consideration order.
//!
//! Each score is compared lexicographically, smallest first; the final
//! element is always the job id, guaranteeing a strict total order so two
//! runs over the same input always consider jobs in the same sequence.

use crate::interval::NEG_INFINITY;
use crate::job::{JobId, JobRun, JobSpec};

/// `(-deadline, -release, -cost, id)` — process later deadlines first.
pub fn backfill_simple_score(spec: &JobSpec) -> (i64, i64, i64, JobId) {
    (-spec.deadline, -spec.release, -spec.cost, spec.id)
}

/// `(succ_count, -dag_deadline, -dag_release, -cost, id)` — jobs with
/// unplaced successors are never considered ahead of jobs without any, since
/// `succ_count` sorts first; among placeable jobs, looser deadlines go last.
pub fn dagfill_score(spec: &JobSpec, run: &JobRun) -> (u32, i64, i64, i64, JobId) {
    (
        run.succ_count,
        -run.dag_deadline,
        -run.dag_release,
        -spec.cost,
        spec.id,
    )
}

/// `(succ_count, feas_cores, -latest_start, feas_region, -cost, id)` — most
/// constrained first: few feasible cores and a late mandatory start must be
/// committed early, with remaining slack as the final differentiator.
pub fn feasint_score(spec: &JobSpec, run: &JobRun) -> (u32, u32, i64, i64, i64, JobId) {
    let latest_start = run
        .latest_startpoint()
        .map(|(_, iv)| iv.end() - 1)
        .unwrap_or(NEG_INFINITY);
    (
        run.succ_count,
        run.feas_cores,
        -latest_start,
        run.feas_region,
        -spec.cost,
        spec.id,
    )
}
