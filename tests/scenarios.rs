//! End-to-end scenarios from `SPEC_FULL.md` §8, driven through the public
//! `paf::run` entry point rather than any one heuristic's internals.

use npsched::heuristics::Heuristic;
use npsched::job::JobSpec;
use npsched::paf;

fn job(id: u32, release: i64, deadline: i64, cost: i64) -> JobSpec {
    JobSpec::new(id, release, deadline, cost)
}

#[test]
fn scenario_a_two_overlapping_jobs_on_one_core() {
    let jobs = vec![job(0, 0, 5, 3), job(1, 2, 7, 3)];
    let result = paf::run(Heuristic::Feasint, &jobs, 1).unwrap();
    assert!(result.unassigned.is_empty());

    let (_, s0) = result.schedule.location_of(0).unwrap();
    let (_, s1) = result.schedule.location_of(1).unwrap();
    assert!(s0 + 3 <= s1 || s1 + 3 <= s0, "jobs must not overlap on the one core");
    assert!(s0 >= 0 && s0 + 3 <= 5);
    assert!(s1 >= 2 && s1 + 3 <= 7);
}

#[test]
fn scenario_b_three_jobs_two_cores_one_backfills_before_the_others() {
    // Window [0, 10), cost 4: two jobs fill the latest start on each core,
    // leaving a [0, 2) sliver on both; the third backfills into it ahead of
    // whichever of the first two landed on its core.
    let jobs = vec![job(0, 0, 10, 4), job(1, 0, 10, 4), job(2, 0, 10, 4)];
    let result = paf::run(Heuristic::Feasint, &jobs, 2).unwrap();
    assert!(result.unassigned.is_empty());

    let cores_used: std::collections::HashSet<_> = (0..3)
        .map(|j| result.schedule.location_of(j).unwrap().0)
        .collect();
    assert_eq!(cores_used.len(), 2, "exactly two cores should be used");
}

#[test]
fn scenario_c_impossible_set_gives_up_with_unassigned() {
    let jobs = vec![job(0, 0, 5, 3), job(1, 0, 5, 3), job(2, 0, 5, 3)];
    let result = paf::run(Heuristic::Feasint, &jobs, 1).unwrap();
    assert!(!result.unassigned.is_empty());
}

#[test]
fn scenario_d_three_job_dag_chain_respects_precedence() {
    let mut j0 = job(0, 0, 10, 3);
    let mut j1 = job(1, 0, 10, 3);
    let mut j2 = job(2, 0, 10, 3);
    j0.successors.insert(1);
    j1.predecessors.insert(0);
    j1.successors.insert(2);
    j2.predecessors.insert(1);
    let jobs = vec![j0, j1, j2];

    let result = paf::run(Heuristic::Dagfill, &jobs, 1).unwrap();
    assert!(result.unassigned.is_empty());

    let (_, s0) = result.schedule.location_of(0).unwrap();
    let (_, s1) = result.schedule.location_of(1).unwrap();
    let (_, s2) = result.schedule.location_of(2).unwrap();
    assert!(s0 + 3 <= s1);
    assert!(s1 + 3 <= s2);
}

#[test]
fn scenario_d_dagfeasint_variant_respects_precedence_too() {
    let mut j0 = job(0, 0, 10, 3);
    let mut j1 = job(1, 0, 10, 3);
    let mut j2 = job(2, 0, 10, 3);
    j0.successors.insert(1);
    j1.predecessors.insert(0);
    j1.successors.insert(2);
    j2.predecessors.insert(1);
    let jobs = vec![j0, j1, j2];

    let result = paf::run(Heuristic::Dagfeasint, &jobs, 1).unwrap();
    assert!(result.unassigned.is_empty());

    let (_, s0) = result.schedule.location_of(0).unwrap();
    let (_, s1) = result.schedule.location_of(1).unwrap();
    let (_, s2) = result.schedule.location_of(2).unwrap();
    assert!(s0 + 3 <= s1);
    assert!(s1 + 3 <= s2);
}

#[test]
fn scenario_e_paf_preallocates_a_job_a_greedy_pass_would_strand() {
    // Jobs 0 and 1 are flexible (wide windows); job 2 only fits at start 0.
    // A regular-order pass that considers 0 and 1 first can strand job 2,
    // but PAF's second round pre-allocates it before running the rest.
    let jobs = vec![job(0, 0, 20, 5), job(1, 0, 20, 5), job(2, 0, 5, 5)];
    let result = paf::run(Heuristic::BackfillSimple, &jobs, 1).unwrap();
    assert!(result.unassigned.is_empty());
}

#[test]
fn scenario_f_scoring_is_stable_across_repeated_runs() {
    let jobs = vec![job(0, 0, 10, 2), job(1, 0, 10, 2), job(2, 0, 10, 2)];
    let first = paf::run(Heuristic::Feasint, &jobs, 3).unwrap();
    let second = paf::run(Heuristic::Feasint, &jobs, 3).unwrap();
    for id in 0..3 {
        assert_eq!(
            first.schedule.location_of(id),
            second.schedule.location_of(id),
            "identical input must produce identical placement across runs"
        );
    }
}

#[test]
fn empty_job_set_yields_empty_schedule_and_unassigned() {
    let jobs: Vec<JobSpec> = Vec::new();
    let result = paf::run(Heuristic::Feasint, &jobs, 2).unwrap();
    assert!(result.unassigned.is_empty());
    assert!(result.schedule.is_empty());
}

#[test]
fn a_job_with_exactly_one_admissible_start_is_forced_there() {
    let jobs = vec![job(0, 2, 5, 3)];
    let result = paf::run(Heuristic::Feasint, &jobs, 1).unwrap();
    assert!(result.unassigned.is_empty());
    assert_eq!(result.schedule.location_of(0), Some((0, 2)));
}

#[test]
fn validator_accepts_every_successful_paf_result() {
    let mut j0 = job(0, 0, 10, 3);
    let mut j1 = job(1, 0, 10, 3);
    j0.successors.insert(1);
    j1.predecessors.insert(0);
    let jobs = vec![j0, j1];

    let result = paf::run(Heuristic::Dagfeasint, &jobs, 1).unwrap();
    npsched::validator::validate(&jobs, &result.schedule, &result.unassigned).unwrap();
}
