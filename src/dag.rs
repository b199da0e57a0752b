//! Precedence-graph tightening of release/deadline bounds, and on-placement
//! propagation to still-pending predecessors and successors.
//!
//! The job precedence graph is modelled as a [`petgraph`] `StableDiGraph`
//! the way `SchedulingBlock` keeps its task graph; unlike the recursive
//! latest-finish/earliest-start computation this is distilled from, the
//! initial tightening pass here walks a topological order rather than
//! recursing, to bound stack depth on large DAGs (see design notes).

use petgraph::stable_graph::StableDiGraph;

use crate::error::NpSchedError;
use crate::interval::{clip_after, clip_before};
use crate::job::{JobId, JobSpec, RunState};

/// Builds the precedence graph over a job set: one node per job, one edge
/// per precedence relation, node weight is the job id.
fn build_graph(jobs: &[JobSpec]) -> StableDiGraph<JobId, ()> {
    let mut graph = StableDiGraph::new();
    let nodes: Vec<_> = jobs.iter().map(|j| graph.add_node(j.id)).collect();
    for spec in jobs {
        for &succ in &spec.successors {
            graph.add_edge(nodes[spec.id as usize], nodes[succ as usize], ());
        }
    }
    graph
}

/// Tightens every job's `dag_release`/`dag_deadline` from its precedence
/// neighbours: `dag_release(j) = max(release(j), max over predecessors p of
/// dag_release(p) + cost(p))`, and symmetrically for `dag_deadline` against
/// successors.
pub fn prep_dag(run: &mut RunState, jobs: &[JobSpec]) -> Result<(), NpSchedError> {
    let graph = build_graph(jobs);
    let order = petgraph::algo::toposort(&graph, None).map_err(|_| NpSchedError::DagCycle)?;

    for &node in &order {
        let id = graph[node];
        let spec = &jobs[id as usize];
        let mut release = spec.release;
        for &p in &spec.predecessors {
            release = release.max(run.get(p).dag_release + jobs[p as usize].cost);
        }
        run.get_mut(id).dag_release = release;
    }

    for &node in order.iter().rev() {
        let id = graph[node];
        let spec = &jobs[id as usize];
        let mut deadline = spec.deadline;
        for &s in &spec.successors {
            deadline = deadline.min(run.get(s).dag_deadline - jobs[s as usize].cost);
        }
        run.get_mut(id).dag_deadline = deadline;
    }

    Ok(())
}

/// On placement of `placed` at `start`, tighten the bounds of its still-
/// pending predecessors and successors (the `dagfill` variant: raw
/// `dag_release`/`dag_deadline` scalars, no feasibility intervals involved).
///
/// `pending` reports whether a neighbour job should still be constrained
/// (queued this phase, or reserved for a later phase); `on_changed` is
/// invoked for every neighbour whose bound actually moved, so the caller can
/// re-queue it with a fresh score.
pub fn propagate_bounds_on_placement(
    run: &mut RunState,
    jobs: &[JobSpec],
    placed: JobId,
    start: i64,
    pending: impl Fn(JobId) -> bool,
    mut on_changed: impl FnMut(JobId),
) {
    let placed_spec = &jobs[placed as usize];
    for &p in &placed_spec.predecessors {
        if !pending(p) {
            continue;
        }
        let r = run.get_mut(p);
        r.succ_count = r.succ_count.saturating_sub(1);
        if start < r.dag_deadline {
            r.dag_deadline = start;
        }
        on_changed(p);
    }
    for &s in &placed_spec.successors {
        if !pending(s) {
            continue;
        }
        let new_release = start + placed_spec.cost;
        let r = run.get_mut(s);
        if new_release > r.dag_release {
            r.dag_release = new_release;
        }
        on_changed(s);
    }
}

/// On placement of `placed` at `start`, tighten the feasibility-interval
/// lists of its still-pending predecessors and successors (the `dagfeasint`
/// variant).
pub fn propagate_intervals_on_placement(
    run: &mut RunState,
    jobs: &[JobSpec],
    placed: JobId,
    start: i64,
    pending: impl Fn(JobId) -> bool,
    mut on_changed: impl FnMut(JobId),
) {
    let placed_spec = &jobs[placed as usize];
    for &p in &placed_spec.predecessors {
        if !pending(p) {
            continue;
        }
        let cost_p = jobs[p as usize].cost;
        let bound = start - cost_p + 1;
        let r = run.get_mut(p);
        r.succ_count = r.succ_count.saturating_sub(1);
        for core in r.feasibility.iter_mut() {
            *core = clip_before(core, bound);
        }
        r.resummarise();
        on_changed(p);
    }
    for &s in &placed_spec.successors {
        if !pending(s) {
            continue;
        }
        let lower = start + placed_spec.cost;
        let r = run.get_mut(s);
        for core in r.feasibility.iter_mut() {
            *core = clip_after(core, lower);
        }
        r.resummarise();
        on_changed(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobSpec;

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
    fn prep_dag_tightens_chain_bounds() {
        let jobs = chain();
        let mut run = RunState::new(&jobs, 1);
        prep_dag(&mut run, &jobs).unwrap();

        assert_eq!(run.get(0).dag_release, 0);
        assert_eq!(run.get(1).dag_release, 3);
        assert_eq!(run.get(2).dag_release, 6);

        assert_eq!(run.get(2).dag_deadline, 10);
        assert_eq!(run.get(1).dag_deadline, 7);
        assert_eq!(run.get(0).dag_deadline, 4);
    }

    #[test]
    fn prep_dag_rejects_cycles() {
        let mut j0 = JobSpec::new(0, 0, 10, 3);
        let mut j1 = JobSpec::new(1, 0, 10, 3);
        j0.successors.insert(1);
        j1.predecessors.insert(0);
        j1.successors.insert(0);
        j0.predecessors.insert(1);
        let jobs = vec![j0, j1];
        let mut run = RunState::new(&jobs, 1);
        assert!(matches!(prep_dag(&mut run, &jobs), Err(NpSchedError::DagCycle)));
    }

    #[test]
    fn propagate_bounds_tightens_predecessor_deadline_and_successor_release() {
        let jobs = chain();
        let mut run = RunState::new(&jobs, 1);
        prep_dag(&mut run, &jobs).unwrap();

        let mut changed = Vec::new();
        propagate_bounds_on_placement(&mut run, &jobs, 1, 4, |_| true, |id| changed.push(id));

        assert_eq!(run.get(0).dag_deadline, 4);
        assert_eq!(run.get(2).dag_release, 7);
        assert_eq!(changed, vec![0, 2]);
    }
}
