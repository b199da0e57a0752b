//! Task-set loading: the CSV formats in `SPEC_FULL.md` §6, hyperperiod
//! computation, and expansion of tasks into a job set over one hyperperiod.
//!
//! Mirrors the reference loader's two auto-detected row shapes (flat,
//! non-DAG task tuples vs. tagged `T`/`V` DAG rows) and its literal-eval
//! permissiveness for the flat format's nested list-of-tuples field, without
//! carrying over Python's `ast.literal_eval` itself — a small recursive-
//! descent parser below covers exactly the grammar the reference format
//! uses: signed integers, floats, `True`/`False`, and nested `[...]`/`(...)`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::job::JobSpec;

/// One segment (a job template) within a DAG task.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: u32,
    pub wcet: i64,
    pub predecessors: Vec<u32>,
}

/// A single periodic task, either flat (`segments` empty) or DAG-structured.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: u32,
    pub period: i64,
    /// Informational only for DAG tasks; the reference loader never uses it
    /// when generating jobs (every job's deadline is `release + period`,
    /// even for DAG task sets — preserved here rather than "fixed", since
    /// fixing it would change which schedules are and aren't feasible).
    pub deadline: Option<i64>,
    pub utilization: Option<f64>,
    pub wcet: i64,
    pub segments: Vec<Segment>,
}

impl Task {
    fn is_dag(&self) -> bool {
        !self.segments.is_empty()
    }
}

/// A loaded task set plus its derived scheduling horizon.
#[derive(Debug, Clone)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
    pub schedulable: bool,
    pub total_util: Option<f64>,
    pub perc_util: Option<f64>,
    pub hyperperiod: i64,
    pub is_dag: bool,
}

/// A task set expanded into concrete jobs over one hyperperiod, with job ids
/// assigned in release-time order.
#[derive(Debug, Clone)]
pub struct JobSet {
    pub taskset: TaskSet,
    pub jobs: Vec<JobSpec>,
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        0
    } else {
        (a / gcd(a, b)) * b
    }
}

fn hyperperiod(periods: &[i64]) -> i64 {
    periods.iter().copied().fold(periods[0], lcm)
}

/// A parsed Python-literal value: the grammar the flat format's first CSV
/// field uses (nested lists/tuples of ints, floats, and bools).
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Seq(Vec<Literal>),
}

impl Literal {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Int(i) => Some(*i),
            Literal::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_seq(&self) -> Option<&[Literal]> {
        match self {
            Literal::Seq(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

struct LiteralParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn parse_value(&mut self) -> Option<Literal> {
        self.skip_ws();
        match self.peek()? {
            b'[' | b'(' => self.parse_seq(),
            b'T' if self.bytes[self.pos..].starts_with(b"True") => {
                self.pos += 4;
                Some(Literal::Bool(true))
            }
            b'F' if self.bytes[self.pos..].starts_with(b"False") => {
                self.pos += 5;
                Some(Literal::Bool(false))
            }
            _ => self.parse_number(),
        }
    }

    fn parse_seq(&mut self) -> Option<Literal> {
        let close = match self.peek()? {
            b'[' => b']',
            b'(' => b')',
            _ => return None,
        };
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Some(Literal::Seq(items));
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.peek() == Some(b',') {
                self.pos += 1;
            }
        }
    }

    fn parse_number(&mut self) -> Option<Literal> {
        let start = self.pos;
        if self.peek() == Some(b'-') || self.peek() == Some(b'+') {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
            } else if c == b'.' && !is_float {
                is_float = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return None;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        if is_float {
            text.parse::<f64>().ok().map(Literal::Float)
        } else {
            text.parse::<i64>().ok().map(Literal::Int)
        }
    }
}

fn parse_literal(field: &str) -> Option<Literal> {
    let mut parser = LiteralParser::new(field.trim());
    let value = parser.parse_value()?;
    parser.skip_ws();
    (parser.pos == parser.bytes.len()).then_some(value)
}

fn malformed(path: &Path, row: usize, reason: impl Into<String>) -> crate::error::NpSchedError {
    crate::error::NpSchedError::InputMalformed {
        path: path.to_path_buf(),
        row,
        reason: reason.into(),
    }
}

/// Loads every task set from `path`, auto-detecting the flat vs. DAG format
/// from the first non-empty row's leading field.
pub fn load_tasksets(path: &Path) -> Result<Vec<TaskSet>, crate::error::NpSchedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    let rows: Vec<&csv::StringRecord> = rows.iter().filter(|r| !r.is_empty()).collect();
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    match rows[0].get(0) {
        Some("T") => Ok(vec![load_dag_taskset(path, &rows)?]),
        Some(_) => load_flat_tasksets(path, &rows),
        None => Ok(Vec::new()),
    }
}

fn load_flat_tasksets(
    path: &Path,
    rows: &[&csv::StringRecord],
) -> Result<Vec<TaskSet>, crate::error::NpSchedError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| load_flat_row(path, i + 1, row))
        .collect()
}

fn load_flat_row(
    path: &Path,
    row_num: usize,
    row: &csv::StringRecord,
) -> Result<TaskSet, crate::error::NpSchedError> {
    let task_tuples_field = row
        .get(0)
        .ok_or_else(|| malformed(path, row_num, "empty row"))?;
    let task_tuples = parse_literal(task_tuples_field)
        .and_then(|l| l.as_seq().map(<[Literal]>::to_vec))
        .ok_or_else(|| malformed(path, row_num, "first field is not a task-tuple list"))?;

    let mut tasks = Vec::with_capacity(task_tuples.len());
    for tuple in &task_tuples {
        let fields = tuple
            .as_seq()
            .ok_or_else(|| malformed(path, row_num, "task entry is not a tuple"))?;
        if fields.len() != 4 {
            return Err(malformed(path, row_num, "task tuple must have 4 fields"));
        }
        let id = fields[0]
            .as_i64()
            .ok_or_else(|| malformed(path, row_num, "task id is not an integer"))? as u32;
        let period = fields[1]
            .as_i64()
            .ok_or_else(|| malformed(path, row_num, "period is not an integer"))?;
        let utilization = fields[2]
            .as_f64()
            .ok_or_else(|| malformed(path, row_num, "utilization is not a number"))?;
        let wcet = fields[3]
            .as_i64()
            .ok_or_else(|| malformed(path, row_num, "wcet is not an integer"))?;
        tasks.push(Task {
            id,
            period,
            deadline: None,
            utilization: Some(utilization),
            wcet,
            segments: Vec::new(),
        });
    }

    let total_util = row.get(1).and_then(|f| f.trim().parse::<f64>().ok());
    let perc_util = row.get(2).and_then(|f| f.trim().parse::<f64>().ok());
    let schedulable = row
        .get(3)
        .and_then(parse_literal)
        .and_then(|l| l.as_bool())
        .unwrap_or(false);

    if tasks.is_empty() {
        return Err(malformed(path, row_num, "task set has no tasks"));
    }
    let periods: Vec<i64> = tasks.iter().map(|t| t.period).collect();

    Ok(TaskSet {
        hyperperiod: hyperperiod(&periods),
        tasks,
        schedulable,
        total_util,
        perc_util,
        is_dag: false,
    })
}

fn load_dag_taskset(
    path: &Path,
    rows: &[&csv::StringRecord],
) -> Result<TaskSet, crate::error::NpSchedError> {
    let mut tasks: Vec<Task> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let row_num = i + 1;
        match row.get(0) {
            Some("T") => {
                let id = parse_int_field(path, row_num, row, 1, "task id")?;
                let period = parse_int_field(path, row_num, row, 2, "period")?;
                let deadline = parse_int_field(path, row_num, row, 3, "deadline")?;
                tasks.push(Task {
                    id: id as u32,
                    period,
                    deadline: Some(deadline),
                    utilization: None,
                    wcet: 0,
                    segments: Vec::new(),
                });
            }
            Some("V") => {
                let task_id = parse_int_field(path, row_num, row, 1, "task id")?;
                let last = tasks
                    .last_mut()
                    .ok_or_else(|| malformed(path, row_num, "segment row before any task row"))?;
                if last.id as i64 != task_id {
                    return Err(malformed(
                        path,
                        row_num,
                        "segment row references a task other than the most recent",
                    ));
                }
                let seg_id = parse_int_field(path, row_num, row, 2, "segment id")?;
                let wcet = parse_int_field(path, row_num, row, 3, "segment wcet")?;
                let mut predecessors = Vec::new();
                for field_idx in 4..row.len() {
                    predecessors.push(parse_int_field(path, row_num, row, field_idx, "predecessor id")? as u32);
                }
                last.segments.push(Segment {
                    id: seg_id as u32,
                    wcet,
                    predecessors,
                });
            }
            Some(other) => {
                return Err(malformed(
                    path,
                    row_num,
                    format!("unrecognised row tag '{other}'"),
                ))
            }
            None => return Err(malformed(path, row_num, "empty row")),
        }
    }

    for task in &mut tasks {
        task.wcet = task.segments.iter().map(|s| s.wcet).sum();
    }

    if tasks.is_empty() {
        return Err(malformed(path, 0, "DAG task set has no tasks"));
    }
    let periods: Vec<i64> = tasks.iter().map(|t| t.period).collect();

    Ok(TaskSet {
        hyperperiod: hyperperiod(&periods),
        tasks,
        schedulable: false,
        total_util: None,
        perc_util: None,
        is_dag: true,
    })
}

fn parse_int_field(
    path: &Path,
    row_num: usize,
    row: &csv::StringRecord,
    idx: usize,
    what: &str,
) -> Result<i64, crate::error::NpSchedError> {
    row.get(idx)
        .ok_or_else(|| malformed(path, row_num, format!("missing {what}")))?
        .trim()
        .parse::<i64>()
        .map_err(|_| malformed(path, row_num, format!("{what} is not an integer")))
}

/// Releases one instance of every task at each multiple of its period within
/// `[0, taskset.hyperperiod)`, builds intra-release precedence edges for DAG
/// tasks, and assigns ids in release-time order (ties broken by input order,
/// matching the reference loader's stable sort).
pub fn expand_jobs(taskset: TaskSet) -> JobSet {
    struct Pending {
        release: i64,
        deadline: i64,
        cost: i64,
        task_id: u32,
        local_predecessors: Vec<usize>,
    }

    let mut pending: Vec<Pending> = Vec::new();
    for task in &taskset.tasks {
        let mut rel = 0;
        while rel < taskset.hyperperiod {
            if task.is_dag() {
                let base = pending.len();
                for seg in &task.segments {
                    pending.push(Pending {
                        release: rel,
                        deadline: rel + task.period,
                        cost: seg.wcet,
                        task_id: task.id,
                        local_predecessors: Vec::new(),
                    });
                    let idx = pending.len() - 1;
                    let local: Vec<usize> = seg
                        .predecessors
                        .iter()
                        .filter_map(|pred_id| {
                            task.segments.iter().position(|s| s.id == *pred_id).map(|p| base + p)
                        })
                        .collect();
                    pending[idx].local_predecessors = local;
                }
            } else {
                pending.push(Pending {
                    release: rel,
                    deadline: rel + task.period,
                    cost: task.wcet,
                    task_id: task.id,
                    local_predecessors: Vec::new(),
                });
            }
            rel += task.period;
        }
    }

    // Stable sort by release time; ties keep the task/segment enumeration order above.
    let mut order: Vec<usize> = (0..pending.len()).collect();
    order.sort_by_key(|&i| pending[i].release);

    let mut new_index = vec![0u32; pending.len()];
    for (new_id, &old_idx) in order.iter().enumerate() {
        new_index[old_idx] = new_id as u32;
    }

    let mut task_counters: std::collections::HashMap<u32, u32> = std::collections::HashMap::new();
    let mut jobs = Vec::with_capacity(pending.len());
    for &old_idx in &order {
        let p = &pending[old_idx];
        let id = new_index[old_idx];
        let mut spec = JobSpec::new(id, p.release, p.deadline, p.cost);
        spec.task_id = p.task_id;
        spec.predecessors = p.local_predecessors.iter().map(|&li| new_index[li]).collect::<BTreeSet<_>>();
        let counter = task_counters.entry(p.task_id).or_insert(0);
        *counter += 1;
        spec.job_of_task = *counter;
        jobs.push(spec);
    }

    // Fill in successors as the transpose of predecessors.
    for i in 0..jobs.len() {
        let preds: Vec<u32> = jobs[i].predecessors.iter().copied().collect();
        for p in preds {
            jobs[p as usize].successors.insert(i as u32);
        }
    }

    JobSet { taskset, jobs }
}

/// Loads every task set in `path` and expands each into a job set.
pub fn load_jobsets(path: &Path) -> Result<Vec<JobSet>, crate::error::NpSchedError> {
    Ok(load_tasksets(path)?
        .into_iter()
        .map(expand_jobs)
        .collect())
}

/// Extracts the leading integer before a `Cores` substring in a file stem,
/// e.g. `4Cores10Tasks-ID3` → `Some(4)`. Returns `None` if no such prefix
/// exists (the caller must then fall back to an explicit `-m` flag).
pub fn infer_core_count(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let marker = name.find("Cores")?;
    let digits_start = name[..marker]
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    name[digits_start..marker].parse().ok()
}

pub fn schedule_output_path(out_dir: &Path, input_path: &Path, job_set_index: usize) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("taskset");
    out_dir.join(format!("{stem}-ID{job_set_index:03}-schedule.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_literal_tuple_list() {
        let lit = parse_literal("[(0, 10, 0.5, 5), (1, 20, 0.3, 4)]").unwrap();
        let seq = lit.as_seq().unwrap();
        assert_eq!(seq.len(), 2);
        let first = seq[0].as_seq().unwrap();
        assert_eq!(first[0].as_i64(), Some(0));
        assert_eq!(first[2].as_f64(), Some(0.5));
    }

    #[test]
    fn parses_bool_literal() {
        assert_eq!(parse_literal("True"), Some(Literal::Bool(true)));
        assert_eq!(parse_literal("False"), Some(Literal::Bool(false)));
    }

    #[test]
    fn hyperperiod_is_lcm_of_periods() {
        assert_eq!(hyperperiod(&[4, 6]), 12);
        assert_eq!(hyperperiod(&[5]), 5);
    }

    #[test]
    fn infers_core_count_from_filename() {
        let p = PathBuf::from("4Cores10Tasks50-ID3.csv");
        assert_eq!(infer_core_count(&p), Some(4));
    }

    #[test]
    fn infer_core_count_is_none_without_cores_marker() {
        let p = PathBuf::from("dataset.csv");
        assert_eq!(infer_core_count(&p), None);
    }

    #[test]
    fn expands_flat_task_into_periodic_jobs() {
        let taskset = TaskSet {
            tasks: vec![Task {
                id: 0,
                period: 5,
                deadline: None,
                utilization: Some(0.6),
                wcet: 3,
                segments: Vec::new(),
            }],
            schedulable: true,
            total_util: Some(0.6),
            perc_util: Some(0.6),
            hyperperiod: 10,
            is_dag: false,
        };
        let jobset = expand_jobs(taskset);
        assert_eq!(jobset.jobs.len(), 2);
        assert_eq!(jobset.jobs[0].release, 0);
        assert_eq!(jobset.jobs[1].release, 5);
        assert_eq!(jobset.jobs[0].deadline, 5);
    }

    #[test]
    fn expands_dag_task_with_intra_release_precedence() {
        let taskset = TaskSet {
            tasks: vec![Task {
                id: 0,
                period: 10,
                deadline: Some(8),
                utilization: None,
                wcet: 0,
                segments: vec![
                    Segment { id: 0, wcet: 2, predecessors: Vec::new() },
                    Segment { id: 1, wcet: 3, predecessors: vec![0] },
                ],
            }],
            schedulable: false,
            total_util: None,
            perc_util: None,
            hyperperiod: 10,
            is_dag: true,
        };
        let jobset = expand_jobs(taskset);
        assert_eq!(jobset.jobs.len(), 2);
        assert!(jobset.jobs[0].successors.contains(&1));
        assert!(jobset.jobs[1].predecessors.contains(&0));
        // deadline uses task.period, not the informational task.deadline field.
        assert_eq!(jobset.jobs[0].deadline, 10);
    }
}
