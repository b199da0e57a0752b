//! The precedence-aware, feasibility-interval driver: combines `feasint`'s
//! windowed placement with `dagfill`'s bound propagation, both triggered on
//! every successful placement.

use std::collections::HashSet;

use crate::dag;
use crate::error::NpSchedError;
use crate::feasibility;
use crate::job::{JobId, JobSpec, RunState};
use crate::queue::ConsiderationQueue;
use crate::schedule::Schedule;
use crate::score::feasint_score;

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
        if run.get(id).succ_count > 0 {
            unassigned.push(id);
            continue;
        }
        let spec = &jobs[id as usize];
        let placement = run.get(id).latest_startpoint();
        let Some((core, window)) = placement else {
            unassigned.push(id);
            continue;
        };
        let start = window.end() - 1;
        schedule.place(id, core, start, spec.cost)?;

        let mut to_requeue = Vec::new();
        dag::propagate_intervals_on_placement(
            run,
            jobs,
            id,
            start,
            |j| queue.contains(j) || later_jobs.contains(&j),
            |j| to_requeue.push(j),
        );

        let candidates: Vec<JobId> = run
            .get(id)
            .overlapping_jobs
            .iter()
            .copied()
            .filter(|j| queue.contains(*j) || later_jobs.contains(j))
            .collect();
        feasibility::update_feas(run, jobs, spec.cost, start, core, candidates.iter().copied());
        to_requeue.extend(candidates);
        to_requeue.sort_unstable();
        to_requeue.dedup();

        for j in to_requeue {
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

    #[test]
    fn places_a_two_job_chain_respecting_precedence() {
        let mut j0 = JobSpec::new(0, 0, 10, 3);
        let mut j1 = JobSpec::new(1, 0, 10, 3);
        j0.successors.insert(1);
        j1.predecessors.insert(0);
        let jobs = vec![j0, j1];

        let mut run = RunState::new(&jobs, 1);
        dag::prep_dag(&mut run, &jobs).unwrap();
        let overlapping = compute_overlapping_jobs(&jobs);
        init_feasibility(&mut run, &jobs, &overlapping);

        let mut schedule = Schedule::new(1);
        let subset: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        let unassigned = super::run(&subset, &HashSet::new(), &jobs, &mut run, &mut schedule).unwrap();
        assert!(unassigned.is_empty());

        let (_, s0) = schedule.location_of(0).unwrap();
        let (_, s1) = schedule.location_of(1).unwrap();
        assert!(s0 + 3 <= s1);
    }
}
