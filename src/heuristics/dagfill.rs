//! The precedence-aware, interval-free driver: backfill against
//! DAG-tightened bounds, gated on a job having no unplaced successors left.

use std::collections::HashSet;

use crate::backfill;
use crate::dag;
use crate::error::NpSchedError;
use crate::job::{JobId, JobSpec, RunState};
use crate::queue::ConsiderationQueue;
use crate::schedule::Schedule;
use crate::score::dagfill_score;

/// Places every job in `subset` whose successors have already all been
/// placed, backfilling against `dag_release`/`dag_deadline`. A job popped
/// from the queue while it still has unplaced successors is reported
/// unplaceable for this phase rather than retried.
pub fn run(
    subset: &[JobId],
    later_jobs: &HashSet<JobId>,
    jobs: &[JobSpec],
    run: &mut RunState,
    schedule: &mut Schedule,
) -> Result<Vec<JobId>, NpSchedError> {
    let mut queue = ConsiderationQueue::new();
    for &id in subset {
        queue.add(id, dagfill_score(&jobs[id as usize], run.get(id)));
    }

    let mut unassigned = Vec::new();
    while let Some(id) = queue.next() {
        if run.get(id).succ_count > 0 {
            unassigned.push(id);
            continue;
        }
        let spec = &jobs[id as usize];
        let window = run.get(id).dag_window();
        match backfill::try_place(schedule, window, spec.cost) {
            Some((core, start)) => {
                schedule.place(id, core, start, spec.cost)?;
                let mut changed = Vec::new();
                dag::propagate_bounds_on_placement(
                    run,
                    jobs,
                    id,
                    start,
                    |j| queue.contains(j) || later_jobs.contains(&j),
                    |j| changed.push(j),
                );
                for j in changed {
                    if queue.contains(j) {
                        queue.update(j, dagfill_score(&jobs[j as usize], run.get(j)));
                    }
                }
            }
            None => unassigned.push(id),
        }
    }
    Ok(unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<JobSpec> {
        let mut j0 = JobSpec::new(0, 0, 10, 3);
        let mut j1 = JobSpec::new(1, 0, 10, 3);
        let mut j2 = JobSpec::new(2, 0, 10, 3);
        j0.successors.insert(1);
        j1.predecessors.insert(0);
        j1.successors.insert(2);
        j2.predecessors.insert(1);
        vec![j0, j1, j2]
    }

    #[test]
    fn places_a_three_job_chain_respecting_precedence() {
        let jobs = chain();
        let mut run = RunState::new(&jobs, 1);
        dag::prep_dag(&mut run, &jobs).unwrap();
        let mut schedule = Schedule::new(1);
        let subset: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        let unassigned = super::run(&subset, &HashSet::new(), &jobs, &mut run, &mut schedule).unwrap();
        assert!(unassigned.is_empty());

        let (_, s0) = schedule.location_of(0).unwrap();
        let (_, s1) = schedule.location_of(1).unwrap();
        let (_, s2) = schedule.location_of(2).unwrap();
        assert!(s0 + 3 <= s1);
        assert!(s1 + 3 <= s2);
    }
}
