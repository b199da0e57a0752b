//! Backfill placement: find the latest admissible start for a job against
//! already-placed allocations, used by the interval-free scheduling drivers
//! (`backfill-simple`, `dagfill`).

use crate::interval::Interval;
use crate::job::CoreId;
use crate::schedule::{Allocation, Schedule};

/// Attempts to place a job of `cost` within `window = [release, deadline)`
/// on any core, trying cores in index order. Returns the first successful
/// `(core, start)`.
pub fn try_place(schedule: &Schedule, window: Interval, cost: i64) -> Option<(CoreId, i64)> {
    for core in 0..schedule.n_cores() {
        if let Some(start) = try_place_on_core(schedule, window, cost, core) {
            return Some((core, start));
        }
    }
    None
}

/// Tries the latest admissible start on `core`; failing that, tries
/// starting just before each relevant blocker (descending by start).
fn try_place_on_core(schedule: &Schedule, window: Interval, cost: i64, core: CoreId) -> Option<i64> {
    if window.is_empty() || cost <= 0 {
        return None;
    }

    let mut blockers: Vec<Allocation> = schedule
        .on_core(core)
        .filter(|a| a.start < window.end() && window.start() < a.end())
        .collect();
    blockers.sort_by(|a, b| b.start.cmp(&a.start));

    let conflicts = |t: i64| -> bool {
        let occupied = Interval::new(t, t + cost);
        blockers
            .iter()
            .any(|b| occupied.overlaps(&Interval::new(b.start, b.end())))
    };

    let latest = window.end() - cost;
    if latest >= window.start() && !conflicts(latest) {
        return Some(latest);
    }

    for blocker in &blockers {
        let upper = blocker.start.min(window.end());
        let t = (upper - cost).max(window.start());
        if t + cost <= window.end() && !conflicts(t) {
            return Some(t);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_at_latest_start_when_free() {
        let schedule = Schedule::new(1);
        let got = try_place(&schedule, Interval::new(0, 10), 3);
        assert_eq!(got, Some((0, 7)));
    }

    #[test]
    fn backs_off_before_a_blocker() {
        let mut schedule = Schedule::new(1);
        schedule.place(99, 0, 7, 3).unwrap();
        let got = try_place(&schedule, Interval::new(0, 10), 3);
        assert_eq!(got, Some((0, 4)));
    }

    #[test]
    fn fails_when_window_too_small() {
        let schedule = Schedule::new(1);
        let got = try_place(&schedule, Interval::new(0, 2), 3);
        assert_eq!(got, None);
    }

    #[test]
    fn tries_next_core_when_first_is_full() {
        let mut schedule = Schedule::new(2);
        schedule.place(99, 0, 0, 10).unwrap();
        let got = try_place(&schedule, Interval::new(0, 10), 3);
        assert_eq!(got, Some((1, 7)));
    }

    #[test]
    fn backfills_between_two_blockers() {
        let mut schedule = Schedule::new(1);
        schedule.place(98, 0, 0, 3).unwrap();
        schedule.place(99, 0, 8, 2).unwrap();
        // window [0, 10), cost 4: latest (6) conflicts with blocker at 8? no,
        // occupied [6,10) overlaps [8,10) -> conflict. Try before blocker at
        // 8: t = min(8,10)-4 = 4, occupied [4,8) overlaps [0,3)? no overlap
        // since 3 <= 4. Accept t=4.
        let got = try_place_on_core_pub(&schedule, Interval::new(0, 10), 4, 0);
        assert_eq!(got, Some(4));
    }

    fn try_place_on_core_pub(
        schedule: &Schedule,
        window: Interval,
        cost: i64,
        core: CoreId,
    ) -> Option<i64> {
        super::try_place_on_core(schedule, window, cost, core)
    }
}
