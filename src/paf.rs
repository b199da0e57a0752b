//! The Problem-Aware-Feasibility meta-heuristic: pre-allocate the jobs that
//! proved hard to place last round, then place the rest, and keep retrying
//! until either everything is placed or a round fails to make progress.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::dag;
use crate::error::NpSchedError;
use crate::feasibility;
use crate::heuristics::{run_phase, Heuristic};
use crate::job::{JobId, JobSpec, RunState};
use crate::schedule::Schedule;

/// Result of running [`run`] to completion (or give-up).
pub struct PafResult {
    pub schedule: Schedule,
    /// Jobs from the input that were never placed. Empty means success.
    pub unassigned: Vec<JobId>,
    /// Every job PAF ever classified as difficult, across all rounds.
    pub difficult: HashSet<JobId>,
}

/// Runs the meta-heuristic to completion over `jobs` on `n_cores`
/// processors using `heuristic`.
///
/// Bounded to at most `jobs.len()` outer iterations: each round that fails
/// to finish moves at least one more job into `difficult`, and `difficult`
/// never shrinks, so the loop cannot cycle forever.
#[instrument(skip(jobs), fields(n_jobs = jobs.len(), n_cores))]
pub fn run(heuristic: Heuristic, jobs: &[JobSpec], n_cores: u32) -> Result<PafResult, NpSchedError> {
    let overlapping = heuristic
        .uses_feasibility_windows()
        .then(|| feasibility::compute_overlapping_jobs(jobs));

    let mut difficult: HashSet<JobId> = HashSet::new();
    let mut regular: HashSet<JobId> = jobs.iter().map(|j| j.id).collect();

    let mut give_up = false;
    let mut unassigned1;
    let mut unassigned2;
    let mut schedule;

    let max_rounds = jobs.len() + 1;
    let mut round = 0;

    loop {
        round += 1;
        if round > max_rounds {
            // difficult grows by at least one job per non-terminal round, so
            // this can only be reached if that invariant was broken.
            return Err(NpSchedError::Unplaceable {
                unassigned: regular.len() + difficult.len(),
            });
        }

        schedule = Schedule::new(n_cores);
        let mut run_state = RunState::new(jobs, n_cores);

        if heuristic.is_dag_aware() {
            dag::prep_dag(&mut run_state, jobs)?;
        }
        if let Some(overlapping) = &overlapping {
            feasibility::init_feasibility(&mut run_state, jobs, overlapping);
        }

        let difficult_vec: Vec<JobId> = difficult.iter().copied().collect();
        unassigned1 = run_phase(
            heuristic,
            &difficult_vec,
            &regular,
            jobs,
            &mut run_state,
            &mut schedule,
        )?;
        if !unassigned1.is_empty() {
            debug!(round, unplaced = unassigned1.len(), "could not pre-allocate difficult jobs");
            give_up = true;
        }

        let regular_vec: Vec<JobId> = regular.iter().copied().collect();
        unassigned2 = run_phase(
            heuristic,
            &regular_vec,
            &HashSet::new(),
            jobs,
            &mut run_state,
            &mut schedule,
        )?;

        for &j in &unassigned2 {
            if difficult.insert(j) {
                regular.remove(&j);
            }
        }
        propagate_difficult_successors(jobs, &unassigned2, &mut difficult, &mut regular);

        if unassigned2.is_empty() {
            info!(round, "found a feasible schedule");
            break;
        }
        if give_up {
            debug!(round, "giving up after this round");
            break;
        }
    }

    let mut unassigned = unassigned1;
    unassigned.extend(unassigned2);
    unassigned.sort_unstable();
    unassigned.dedup();

    Ok(PafResult {
        schedule,
        unassigned,
        difficult,
    })
}

/// Every successor (transitively) of a newly-unplaced job is also marked
/// difficult, so it is pre-allocated alongside its blocking predecessor next
/// round rather than being discovered unplaceable all over again.
fn propagate_difficult_successors(
    jobs: &[JobSpec],
    newly_unassigned: &[JobId],
    difficult: &mut HashSet<JobId>,
    regular: &mut HashSet<JobId>,
) {
    let mut stack: Vec<JobId> = newly_unassigned.to_vec();
    while let Some(j) = stack.pop() {
        for &s in &jobs[j as usize].successors {
            if difficult.insert(s) {
                regular.remove(&s);
                stack.push(s);
            }
        }
    }
}
