//! Schedule CSV output, matching the column layout in `SPEC_FULL.md` §6.
//!
//! The reference tool pads every field to a fixed width for terminal-
//! friendly output; since this is a CSV consumed by other tooling rather
//! than read by a human at a terminal, only the comma-separated values and
//! the two-decimal fixed-point time formatting are preserved.

use std::io::Write;

use crate::job::JobSpec;
use crate::schedule::Schedule;

const HEADER: &str = "Job,Core,Start,End,Release,Deadline,Cost,Task,Job-of-Task";

/// Writes one row per allocation, sorted by job id, with a header line.
pub fn write_schedule<W: Write>(
    mut out: W,
    jobs: &[JobSpec],
    schedule: &Schedule,
) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for alloc in schedule.all_sorted_by_job() {
        let spec = &jobs[alloc.job as usize];
        writeln!(
            out,
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{},{}",
            alloc.job,
            alloc.core,
            alloc.start as f64,
            alloc.end() as f64,
            spec.release as f64,
            spec.deadline as f64,
            spec.cost as f64,
            spec.task_id,
            spec.job_of_task,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_one_row_per_allocation() {
        let mut spec = JobSpec::new(0, 0, 5, 3);
        spec.task_id = 7;
        spec.job_of_task = 1;
        let jobs = vec![spec];
        let mut schedule = Schedule::new(1);
        schedule.place(0, 0, 1, 3).unwrap();

        let mut buf = Vec::new();
        write_schedule(&mut buf, &jobs, &schedule).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("0,0,1.00,4.00,0.00,5.00,3.00,7,1"));
        assert_eq!(lines.next(), None);
    }
}
