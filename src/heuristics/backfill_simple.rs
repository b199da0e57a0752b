//! The precedence-free, interval-free driver: sort once by deadline, backfill
//! each job in turn.

use crate::backfill;
use crate::error::NpSchedError;
use crate::interval::Interval;
use crate::job::{JobId, JobSpec};
use crate::schedule::Schedule;
use crate::score::backfill_simple_score;

/// Places every job in `subset` against raw `release`/`deadline` bounds, in
/// descending-deadline order. Returns the ids that could not be placed.
pub fn run(
    subset: &[JobId],
    jobs: &[JobSpec],
    schedule: &mut Schedule,
) -> Result<Vec<JobId>, NpSchedError> {
    let mut ordered: Vec<JobId> = subset.to_vec();
    ordered.sort_by_key(|&id| backfill_simple_score(&jobs[id as usize]));

    let mut unassigned = Vec::new();
    for id in ordered {
        let spec = &jobs[id as usize];
        let window = Interval::new(spec.release, spec.deadline);
        match backfill::try_place(schedule, window, spec.cost) {
            Some((core, start)) => schedule.place(id, core, start, spec.cost)?,
            None => unassigned.push(id),
        }
    }
    Ok(unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_non_conflicting_jobs_on_one_core() {
        let jobs = vec![
            JobSpec::new(0, 0, 5, 3),
            JobSpec::new(1, 2, 7, 3),
        ];
        let mut schedule = Schedule::new(1);
        let unassigned = run(&[0, 1], &jobs, &mut schedule).unwrap();
        assert!(unassigned.is_empty());
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn reports_unplaceable_job_when_core_is_too_small() {
        let jobs = vec![
            JobSpec::new(0, 0, 5, 3),
            JobSpec::new(1, 0, 5, 3),
            JobSpec::new(2, 0, 5, 3),
        ];
        let mut schedule = Schedule::new(1);
        let unassigned = run(&[0, 1, 2], &jobs, &mut schedule).unwrap();
        assert_eq!(unassigned.len(), 1);
    }
}
