//! The output of a heuristic run: a non-overlapping, per-core set of
//! allocations.
//!
//! Structurally this follows the same `BTreeMap`-by-start /
//! `HashMap`-by-id pattern the single-core scheduling structure this is
//! adapted from uses, just duplicated once per core and keyed on integer
//! times rather than a dimensioned quantity.

use std::collections::{BTreeMap, HashMap};

use crate::error::{InvariantViolation, NpSchedError};
use crate::job::{CoreId, JobId};

/// One job occupying `[start, start + cost)` on some core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub job: JobId,
    pub core: CoreId,
    pub start: i64,
    pub cost: i64,
}

impl Allocation {
    pub fn end(&self) -> i64 {
        self.start + self.cost
    }
}

/// Non-overlapping per-core allocation set.
#[derive(Debug, Clone)]
pub struct Schedule {
    cores: Vec<BTreeMap<i64, (JobId, i64)>>,
    location: HashMap<JobId, (CoreId, i64)>,
}

impl Schedule {
    pub fn new(n_cores: u32) -> Self {
        Self {
            cores: vec![BTreeMap::new(); n_cores as usize],
            location: HashMap::new(),
        }
    }

    pub fn n_cores(&self) -> u32 {
        self.cores.len() as u32
    }

    pub fn len(&self) -> usize {
        self.location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }

    pub fn contains(&self, job: JobId) -> bool {
        self.location.contains_key(&job)
    }

    pub fn location_of(&self, job: JobId) -> Option<(CoreId, i64)> {
        self.location.get(&job).copied()
    }

    /// Places `job` (cost `cost`) at `start` on `core`. Fails if `job` is
    /// already placed, or if it would overlap an existing allocation on that
    /// core.
    pub fn place(
        &mut self,
        job: JobId,
        core: CoreId,
        start: i64,
        cost: i64,
    ) -> Result<(), NpSchedError> {
        if self.location.contains_key(&job) {
            return Err(NpSchedError::DuplicateJobId(job));
        }
        let end = start + cost;
        let track = &mut self.cores[core as usize];

        if let Some((&other_start, &(other_job, other_cost))) = track.range(..start).next_back() {
            if other_start + other_cost > start {
                return Err(InvariantViolation::Overlap {
                    core,
                    a: job,
                    b: other_job,
                }
                .into());
            }
        }
        if let Some((&other_start, &(other_job, _))) = track.range(start..).next() {
            if other_start < end {
                return Err(InvariantViolation::Overlap {
                    core,
                    a: job,
                    b: other_job,
                }
                .into());
            }
        }

        track.insert(start, (job, cost));
        self.location.insert(job, (core, start));
        Ok(())
    }

    /// Allocations on `core`, in start-time order.
    pub fn on_core(&self, core: CoreId) -> impl Iterator<Item = Allocation> + '_ {
        self.cores[core as usize]
            .iter()
            .map(move |(&start, &(job, cost))| Allocation {
                job,
                core,
                start,
                cost,
            })
    }

    /// Every allocation, sorted by job id (the order the CSV writer uses).
    pub fn all_sorted_by_job(&self) -> Vec<Allocation> {
        let mut out: Vec<_> = (0..self.cores.len() as u32)
            .flat_map(|c| self.on_core(c).collect::<Vec<_>>())
            .collect();
        out.sort_by_key(|a| a.job);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_rejects_overlap() {
        let mut s = Schedule::new(1);
        s.place(0, 0, 0, 5).unwrap();
        assert!(s.place(1, 0, 3, 5).is_err());
    }

    #[test]
    fn place_allows_back_to_back() {
        let mut s = Schedule::new(1);
        s.place(0, 0, 0, 5).unwrap();
        assert!(s.place(1, 0, 5, 5).is_ok());
    }

    #[test]
    fn place_allows_disjoint_cores() {
        let mut s = Schedule::new(2);
        s.place(0, 0, 0, 5).unwrap();
        assert!(s.place(1, 1, 0, 5).is_ok());
    }

    #[test]
    fn all_sorted_by_job_orders_across_cores() {
        let mut s = Schedule::new(2);
        s.place(2, 0, 0, 5).unwrap();
        s.place(0, 1, 0, 5).unwrap();
        s.place(1, 0, 5, 5).unwrap();
        let jobs: Vec<_> = s.all_sorted_by_job().iter().map(|a| a.job).collect();
        assert_eq!(jobs, vec![0, 1, 2]);
    }
}
