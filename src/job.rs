//! Job identity (`JobSpec`) and per-run mutable scheduling state (`JobRun`).
//!
//! The source this crate's algorithms are drawn from mutates scheduling
//! state directly on a job object. Here the two are kept apart: a
//! [`JobSpec`] never changes after the task set is loaded, and everything a
//! heuristic run touches lives in a [`JobRun`] held in a table indexed by
//! job id, reinitialised at the start of every
//! [`paf`](crate::paf)-meta-heuristic iteration.

use std::collections::BTreeSet;

use crate::interval::{total_width, Interval};

/// Stable identifier for a job, assigned sequentially by the loader.
pub type JobId = u32;

/// Processor core identifier, `0..n_cores`.
pub type CoreId = u32;

/// Immutable job identity: timing bounds, cost, and precedence edges.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobSpec {
    pub id: JobId,
    pub release: i64,
    pub deadline: i64,
    pub cost: i64,
    pub predecessors: BTreeSet<JobId>,
    pub successors: BTreeSet<JobId>,
    /// The task this job was released from (loader bookkeeping only).
    pub task_id: u32,
    /// This job's ordinal among the jobs released by its task.
    pub job_of_task: u32,
}

impl JobSpec {
    pub fn new(id: JobId, release: i64, deadline: i64, cost: i64) -> Self {
        Self {
            id,
            release,
            deadline,
            cost,
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
            task_id: 0,
            job_of_task: 0,
        }
    }

    /// The admissible-start window `[release, deadline - cost + 1)`, ignoring
    /// precedence. Empty if the job cannot fit even in isolation.
    pub fn raw_window(&self) -> Interval {
        let upper = self.deadline - self.cost + 1;
        if upper <= self.release {
            Interval::new(self.release, self.release)
        } else {
            Interval::new(self.release, upper)
        }
    }

    pub fn overlaps_window(&self, other: &JobSpec) -> bool {
        Interval::new(self.release, self.deadline).overlaps(&Interval::new(
            other.release,
            other.deadline,
        ))
    }
}

/// Per-run mutable state for one job, stored in a [`RunState`] table rather
/// than on the job itself.
#[derive(Debug, Clone)]
pub struct JobRun {
    /// Precedence-tightened release; starts at `spec.release`.
    pub dag_release: i64,
    /// Precedence-tightened deadline; starts at `spec.deadline`.
    pub dag_deadline: i64,
    /// Count of successors not yet placed. Zero means this job may be
    /// placed immediately as far as precedence is concerned.
    pub succ_count: u32,
    /// Per-core disjoint, sorted lists of admissible start times.
    pub feasibility: Vec<Vec<Interval>>,
    /// Number of cores with a non-empty feasibility list.
    pub feas_cores: u32,
    /// Sum of feasibility interval widths across all cores.
    pub feas_region: i64,
    /// Generation of this job's current queue entry, if queued.
    pub queue_generation: Option<u64>,
    /// Jobs whose `[release, deadline)` window overlaps this job's, computed
    /// once per run.
    pub overlapping_jobs: Vec<JobId>,
    /// Placement outcome once decided.
    pub placement: Option<(CoreId, i64)>,
}

impl JobRun {
    pub fn new(spec: &JobSpec, n_cores: u32) -> Self {
        Self {
            dag_release: spec.release,
            dag_deadline: spec.deadline,
            succ_count: spec.successors.len() as u32,
            feasibility: vec![Vec::new(); n_cores as usize],
            feas_cores: 0,
            feas_region: 0,
            queue_generation: None,
            overlapping_jobs: Vec::new(),
            placement: None,
        }
    }

    /// Initialises the feasibility window to the full admissible-start range
    /// on every core, given the current `dag_release`/`dag_deadline`.
    pub fn init_feasibility(&mut self, cost: i64) {
        let upper = self.dag_deadline - cost + 1;
        let window = if upper <= self.dag_release {
            None
        } else {
            Some(Interval::new(self.dag_release, upper))
        };
        self.feas_cores = 0;
        self.feas_region = 0;
        for core in self.feasibility.iter_mut() {
            core.clear();
            if let Some(w) = window {
                core.push(w);
                self.feas_cores += 1;
                self.feas_region += w.width();
            }
        }
    }

    /// Recomputes `feas_cores`/`feas_region` from the feasibility lists
    /// after an in-place mutation.
    pub fn resummarise(&mut self) {
        self.feas_cores = self.feasibility.iter().filter(|c| !c.is_empty()).count() as u32;
        self.feas_region = self.feasibility.iter().map(|c| total_width(c)).sum();
    }

    /// The `(core, interval)` pair with the greatest upper bound, i.e. the
    /// latest admissible start across all cores.
    pub fn latest_startpoint(&self) -> Option<(CoreId, Interval)> {
        self.feasibility
            .iter()
            .enumerate()
            .filter_map(|(core, ivs)| ivs.last().map(|iv| (core as CoreId, *iv)))
            .max_by_key(|(core, iv)| (iv.end(), std::cmp::Reverse(*core)))
    }

    pub fn dag_window(&self) -> Interval {
        let upper = self.dag_deadline;
        if upper <= self.dag_release {
            Interval::new(self.dag_release, self.dag_release)
        } else {
            Interval::new(self.dag_release, upper)
        }
    }
}

/// Per-run state for every job, indexed by [`JobId`].
///
/// Recreated at the top of each PAF iteration; never shared across
/// iterations.
#[derive(Debug, Clone)]
pub struct RunState {
    runs: Vec<JobRun>,
}

impl RunState {
    pub fn new(jobs: &[JobSpec], n_cores: u32) -> Self {
        Self {
            runs: jobs.iter().map(|j| JobRun::new(j, n_cores)).collect(),
        }
    }

    pub fn get(&self, id: JobId) -> &JobRun {
        &self.runs[id as usize]
    }

    pub fn get_mut(&mut self, id: JobId) -> &mut JobRun {
        &mut self.runs[id as usize]
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
