//! Post-heuristic validation: re-checks every invariant in `SPEC_FULL.md`
//! §8 against a finished `(Schedule, unassigned)` pair.
//!
//! A violation here is never a recoverable condition — it means a heuristic
//! placed something it shouldn't have, which is a bug in this crate, not a
//! property of the input. Mirrors the reference tool's `schedule.validate`,
//! which asserts rather than returns a `Result`; here the same checks
//! produce a structured `InvariantViolation` instead of panicking.

use crate::error::{InvariantViolation, NpSchedError};
use crate::job::JobId;
use crate::job::JobSpec;
use crate::schedule::Schedule;

/// Checks overlap-freedom, release/deadline compliance, precedence
/// compliance, and full coverage of `jobs` by `schedule` and `unassigned`.
pub fn validate(
    jobs: &[JobSpec],
    schedule: &Schedule,
    unassigned: &[JobId],
) -> Result<(), NpSchedError> {
    check_overlaps(schedule)?;
    check_release_deadline(jobs, schedule)?;
    check_precedence(jobs, schedule)?;
    check_coverage(jobs, schedule, unassigned)?;
    Ok(())
}

fn check_overlaps(schedule: &Schedule) -> Result<(), NpSchedError> {
    for core in 0..schedule.n_cores() {
        let mut prev: Option<crate::schedule::Allocation> = None;
        for alloc in schedule.on_core(core) {
            if let Some(p) = prev {
                if p.end() > alloc.start {
                    return Err(InvariantViolation::Overlap {
                        core,
                        a: p.job,
                        b: alloc.job,
                    }
                    .into());
                }
            }
            prev = Some(alloc);
        }
    }
    Ok(())
}

fn check_release_deadline(jobs: &[JobSpec], schedule: &Schedule) -> Result<(), NpSchedError> {
    for spec in jobs {
        let Some((_, start)) = schedule.location_of(spec.id) else {
            continue;
        };
        if start < spec.release {
            return Err(InvariantViolation::StartsBeforeRelease {
                job: spec.id,
                start,
                release: spec.release,
            }
            .into());
        }
        let finish = start + spec.cost;
        if finish > spec.deadline {
            return Err(InvariantViolation::FinishesAfterDeadline {
                job: spec.id,
                finish,
                deadline: spec.deadline,
            }
            .into());
        }
    }
    Ok(())
}

fn check_precedence(jobs: &[JobSpec], schedule: &Schedule) -> Result<(), NpSchedError> {
    for spec in jobs {
        let Some((_, succ_start)) = schedule.location_of(spec.id) else {
            continue;
        };
        for &pred in &spec.predecessors {
            let Some((_, pred_start)) = schedule.location_of(pred) else {
                continue;
            };
            let pred_finish = pred_start + jobs[pred as usize].cost;
            if pred_finish > succ_start {
                return Err(InvariantViolation::PrecedenceViolated {
                    pred,
                    succ: spec.id,
                    pred_finish,
                    succ_start,
                }
                .into());
            }
        }
    }
    Ok(())
}

fn check_coverage(
    jobs: &[JobSpec],
    schedule: &Schedule,
    unassigned: &[JobId],
) -> Result<(), NpSchedError> {
    let unassigned: std::collections::HashSet<JobId> = unassigned.iter().copied().collect();
    for spec in jobs {
        let in_schedule = schedule.contains(spec.id);
        let in_unassigned = unassigned.contains(&spec.id);
        if in_schedule && in_unassigned {
            return Err(InvariantViolation::DoubleCounted { job: spec.id }.into());
        }
        if !in_schedule && !in_unassigned {
            return Err(InvariantViolation::Missing { job: spec.id }.into());
        }
    }
    Ok(())
}
