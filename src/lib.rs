//! npsched - partitioned multiprocessor scheduling via backfill heuristics.
//!
//! A small family of heuristics (`backfill-simple`, `feasint`, `dagfill`,
//! `dagfeasint`) that construct a feasible, non-preemptive schedule for a
//! set of real-time jobs with release times, deadlines, integer costs, and
//! optional precedence constraints, wrapped in the Problem-Aware-
//! Feasibility (PAF) meta-heuristic that retries around jobs the first pass
//! couldn't place.

pub mod backfill;
pub mod dag;
pub mod error;
pub mod feasibility;
pub mod heuristics;
pub mod interval;
pub mod job;
pub mod loader;
pub mod paf;
pub mod queue;
pub mod schedule;
pub mod score;
pub mod validator;
pub mod writer;

pub use error::NpSchedError;
pub use heuristics::{Heuristic, HeuristicFamily};
pub use job::{CoreId, JobId, JobSpec};
pub use paf::PafResult;
pub use schedule::{Allocation, Schedule};
