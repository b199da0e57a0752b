//! The precedence-free, feasibility-interval driver: maintain per-core
//! admissible-start windows and always place the most constrained job at its
//! latest feasible start.

use std::collections::HashSet;

use crate::error::NpSchedError;
use crate::feasibility;
use crate::job::{JobId, JobSpec, RunState};
use crate::queue::ConsiderationQueue;
use crate::schedule::Schedule;
use crate::score::feasint_score;

/// Places every job in `subset`, consulting and shrinking feasibility
/// windows as jobs are placed. `later_jobs` are jobs not in `subset` this
/// phase whose windows must still be kept accurate (the PAF difficult
/// phase's view of the regular set). Returns the ids that could not be
/// placed.
pub fn run(
    subset: &[JobId],
    later_jobs: &HashSet<JobId>,
    jobs: &[JobSpec],
    run: &mut RunState,
    schedule: &mut Schedule,
) -> Result<Vec<JobId>, NpSchedError> {
    let mut queue = ConsiderationQueue::new();
    for &id in subset {
        queue.add(id, feasint_score(&jobs[id as usize], run.get(id)));
    }

    let mut unassigned = Vec::new();
    while let Some(id) = queue.next() {
        let spec = &jobs[id as usize];
        let placement = run.get(id).latest_startpoint();
        let Some((core, window)) = placement else {
            unassigned.push(id);
            continue;
        };
        let start = window.end() - 1;
        schedule.place(id, core, start, spec.cost)?;

        let candidates: Vec<JobId> = run
            .get(id)
            .overlapping_jobs
            .iter()
            .copied()
            .filter(|j| queue.contains(*j) || later_jobs.contains(j))
            .collect();
        feasibility::update_feas(run, jobs, spec.cost, start, core, candidates.iter().copied());
        for &j in &candidates {
            if queue.contains(j) {
                queue.update(j, feasint_score(&jobs[j as usize], run.get(j)));
            }
        }
    }
    Ok(unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::{compute_overlapping_jobs, init_feasibility};

    fn prepare(jobs: &[JobSpec], n_cores: u32) -> RunState {
        let mut run = RunState::new(jobs, n_cores);
        let overlapping = compute_overlapping_jobs(jobs);
        init_feasibility(&mut run, jobs, &overlapping);
        run
    }

    #[test]
    fn places_two_overlapping_jobs_on_one_core() {
        let jobs = vec![JobSpec::new(0, 0, 5, 3), JobSpec::new(1, 2, 7, 3)];
        let mut run = prepare(&jobs, 1);
        let mut schedule = Schedule::new(1);
        let unassigned = run_variant(&jobs, &mut run, &mut schedule);
        assert!(unassigned.is_empty());
        assert_eq!(schedule.len(), 2);
    }

    fn run_variant(jobs: &[JobSpec], run: &mut RunState, schedule: &mut Schedule) -> Vec<JobId> {
        let subset: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        super::run(&subset, &HashSet::new(), jobs, run, schedule).unwrap()
    }

    #[test]
    fn detects_infeasible_job_set() {
        let jobs = vec![
            JobSpec::new(0, 0, 5, 3),
            JobSpec::new(1, 0, 5, 3),
            JobSpec::new(2, 0, 5, 3),
        ];
        let mut run = prepare(&jobs, 1);
        let mut schedule = Schedule::new(1);
        let unassigned = run_variant(&jobs, &mut run, &mut schedule);
        assert_eq!(unassigned.len(), 1);
    }
}
