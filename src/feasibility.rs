//! Feasibility-window maintenance: precomputing which job pairs can ever
//! overlap, and shrinking a job's admissible-start windows when another job
//! is placed.

use crate::interval::{subtract_from_list, Interval};
use crate::job::{CoreId, JobId, JobSpec, RunState};

/// For every job, the ids of other jobs whose `[release, deadline)` window
/// overlaps it. Computed once per run; `O(n^2)` pairwise comparison, fine for
/// the job-set sizes this crate targets (see design notes on substituting an
/// interval tree for very large inputs).
pub fn compute_overlapping_jobs(jobs: &[JobSpec]) -> Vec<Vec<JobId>> {
    let mut overlapping = vec![Vec::new(); jobs.len()];
    for i in 0..jobs.len() {
        for j in (i + 1)..jobs.len() {
            if jobs[i].overlaps_window(&jobs[j]) {
                overlapping[i].push(jobs[j].id);
                overlapping[j].push(jobs[i].id);
            }
        }
    }
    overlapping
}

/// Initialises every job's feasibility windows (to the full admissible-start
/// range implied by its current `dag_release`/`dag_deadline`) and its
/// `overlapping_jobs` list.
pub fn init_feasibility(run: &mut RunState, jobs: &[JobSpec], overlapping: &[Vec<JobId>]) {
    for spec in jobs {
        let r = run.get_mut(spec.id);
        r.init_feasibility(spec.cost);
        r.overlapping_jobs = overlapping[spec.id as usize].clone();
    }
}

/// Shrinks the feasibility windows of every job in `candidates` on `core`,
/// after `scheduled` (cost `scheduled_cost`) is placed at `start` on that
/// core. `candidates` should already be filtered to jobs the caller still
/// cares about (queued this phase, or reserved for a later phase).
pub fn update_feas(
    run: &mut RunState,
    jobs: &[JobSpec],
    scheduled_cost: i64,
    start: i64,
    core: CoreId,
    candidates: impl IntoIterator<Item = JobId>,
) {
    for job in candidates {
        let cost = jobs[job as usize].cost;
        let blocked = Interval::new(start - cost + 1, start + scheduled_cost);
        let r = run.get_mut(job);
        let idx = core as usize;
        if idx >= r.feasibility.len() {
            continue;
        }
        r.feasibility[idx] = subtract_from_list(&r.feasibility[idx], &blocked);
        r.resummarise();
    }
}
