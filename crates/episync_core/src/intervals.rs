//! Interval algebra over half-open millisecond spans.
//!
//! All spans are `[start_ms, end_ms)`. A list is *normalized* when it is
//! sorted by start and no two entries overlap or touch. Every function
//! that returns a list of intervals returns a normalized one, except
//! [`complement`] whose output is normalized by construction.
//!
//! All functions are pure - no I/O, no side effects.

use serde::{Deserialize, Serialize};

/// A half-open time span `[start_ms, end_ms)`.
///
/// Field order matters: the derived `Ord` sorts by `(start_ms, end_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start in milliseconds.
    pub start_ms: i64,
    /// Exclusive end in milliseconds.
    pub end_ms: i64,
}

impl Interval {
    /// Create an interval, returning `None` unless `end_ms > start_ms`.
    pub fn new(start_ms: i64, end_ms: i64) -> Option<Self> {
        (end_ms > start_ms).then_some(Self { start_ms, end_ms })
    }

    /// Length of the span in milliseconds (0 for empty or inverted spans).
    pub fn duration_ms(&self) -> i64 {
        (self.end_ms - self.start_ms).max(0)
    }

    /// Whether the span covers no time.
    pub fn is_empty(&self) -> bool {
        self.end_ms <= self.start_ms
    }

    /// Clip into `[0, max_ms]`, returning `None` when nothing is left.
    pub fn clip(&self, max_ms: i64) -> Option<Self> {
        let start = self.start_ms.clamp(0, max_ms.max(0));
        let end = self.end_ms.clamp(0, max_ms.max(0));
        Self::new(start, end)
    }

    /// Move both endpoints by `offset_ms`.
    pub fn shifted(&self, offset_ms: i64) -> Self {
        Self {
            start_ms: self.start_ms + offset_ms,
            end_ms: self.end_ms + offset_ms,
        }
    }
}

/// Sort and coalesce intervals into a normalized list.
///
/// An interval is folded into the running one when its start is `<=` the
/// running end, so touching spans are joined. Empty spans are dropped.
pub fn merge(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.iter().copied().filter(|i| !i.is_empty()).collect();
    sorted.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(current) if interval.start_ms <= current.end_ms => {
                current.end_ms = current.end_ms.max(interval.end_ms);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Gaps of a sorted, merged list within `[0, max_ms)`.
///
/// `merge(x)` and `complement(&merge(x), max_ms)` together partition
/// `[0, max_ms)` whenever `x` lies inside the window.
pub fn complement(merged: &[Interval], max_ms: i64) -> Vec<Interval> {
    let mut gaps = Vec::with_capacity(merged.len() + 1);
    let mut cursor = 0_i64;

    for interval in merged {
        let gap_end = interval.start_ms.min(max_ms);
        if gap_end > cursor {
            gaps.push(Interval {
                start_ms: cursor,
                end_ms: gap_end,
            });
        }
        cursor = cursor.max(interval.end_ms);
    }

    if cursor < max_ms {
        gaps.push(Interval {
            start_ms: cursor,
            end_ms: max_ms,
        });
    }
    gaps
}

/// Total time covered by both lists.
///
/// Two-pointer sweep, O(|a| + |b|). Both inputs must be normalized.
pub fn overlap_duration(a: &[Interval], b: &[Interval]) -> i64 {
    let (mut i, mut j) = (0, 0);
    let mut total = 0_i64;

    while i < a.len() && j < b.len() {
        let start = a[i].start_ms.max(b[j].start_ms);
        let end = a[i].end_ms.min(b[j].end_ms);
        if end > start {
            total += end - start;
        }

        // Advance whichever ends first
        if a[i].end_ms < b[j].end_ms {
            i += 1;
        } else {
            j += 1;
        }
    }
    total
}

/// Clip every interval into `[0, max_ms]`, drop empties, then merge.
pub fn intervals_within(items: &[Interval], max_ms: i64) -> Vec<Interval> {
    let clipped: Vec<Interval> = items.iter().filter_map(|i| i.clip(max_ms)).collect();
    merge(&clipped)
}

/// Shift every interval by `offset_ms`, then restrict to the window.
pub fn shift_intervals(intervals: &[Interval], offset_ms: i64, max_ms: i64) -> Vec<Interval> {
    let shifted: Vec<Interval> = intervals.iter().map(|i| i.shifted(offset_ms)).collect();
    intervals_within(&shifted, max_ms)
}

/// Sum of interval durations.
pub fn total_duration(intervals: &[Interval]) -> i64 {
    intervals.iter().map(Interval::duration_ms).sum()
}

/// Start points of every interval, in input order.
pub fn starts(intervals: &[Interval]) -> Vec<i64> {
    intervals.iter().map(|i| i.start_ms).collect()
}

/// End points of every interval, in input order.
pub fn ends(intervals: &[Interval]) -> Vec<i64> {
    intervals.iter().map(|i| i.end_ms).collect()
}

/// Distance from `value` to the closest entry of an ascending list.
///
/// Returns `f64::INFINITY` for an empty list.
pub fn nearest_distance_ms(sorted_points: &[i64], value: i64) -> f64 {
    let hi = sorted_points.partition_point(|&p| p < value);

    let right = sorted_points
        .get(hi)
        .map(|&p| (p - value).abs() as f64)
        .unwrap_or(f64::INFINITY);
    let left = hi
        .checked_sub(1)
        .and_then(|lo| sorted_points.get(lo))
        .map(|&p| (value - p).abs() as f64)
        .unwrap_or(f64::INFINITY);

    left.min(right)
}

/// Smooth proximity of `points` to an ascending list of reference points.
///
/// Mean over `points` of `exp(-d / max(1, scale_ms))` where `d` is the
/// distance to the nearest reference. 1.0 on exact hits, 0.0 when either
/// list is empty.
pub fn boundary_closeness(points: &[i64], sorted_refs: &[i64], scale_ms: f64) -> f64 {
    if points.is_empty() || sorted_refs.is_empty() {
        return 0.0;
    }

    let scale = scale_ms.max(1.0);
    let sum: f64 = points
        .iter()
        .map(|&p| (-nearest_distance_ms(sorted_refs, p) / scale).exp())
        .sum();
    sum / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start_ms: i64, end_ms: i64) -> Interval {
        Interval { start_ms, end_ms }
    }

    #[test]
    fn merge_coalesces_overlapping_and_touching() {
        let merged = merge(&[iv(5000, 6000), iv(0, 1000), iv(500, 2000), iv(2000, 2500)]);
        assert_eq!(merged, vec![iv(0, 2500), iv(5000, 6000)]);
    }

    #[test]
    fn merge_keeps_contained_interval_end() {
        let merged = merge(&[iv(0, 10_000), iv(100, 200)]);
        assert_eq!(merged, vec![iv(0, 10_000)]);
    }

    #[test]
    fn merge_drops_empty_spans() {
        let merged = merge(&[iv(100, 100), iv(300, 200), iv(0, 50)]);
        assert_eq!(merged, vec![iv(0, 50)]);
    }

    #[test]
    fn complement_fills_gaps_and_tail() {
        let gaps = complement(&[iv(2500, 4000)], 10_000);
        assert_eq!(gaps, vec![iv(0, 2500), iv(4000, 10_000)]);
    }

    #[test]
    fn complement_of_full_cover_is_empty() {
        assert!(complement(&[iv(0, 10_000)], 10_000).is_empty());
        assert!(complement(&[], 0).is_empty());
    }

    #[test]
    fn complement_of_nothing_is_whole_window() {
        assert_eq!(complement(&[], 800), vec![iv(0, 800)]);
    }

    #[test]
    fn overlap_duration_sums_pairwise_intersections() {
        let a = [iv(0, 1000), iv(2000, 3000)];
        let b = [iv(500, 2500)];
        assert_eq!(overlap_duration(&a, &b), 1000);
        assert_eq!(overlap_duration(&b, &a), 1000);
    }

    #[test]
    fn overlap_duration_of_disjoint_lists_is_zero() {
        assert_eq!(overlap_duration(&[iv(0, 100)], &[iv(100, 200)]), 0);
        assert_eq!(overlap_duration(&[], &[iv(0, 200)]), 0);
    }

    #[test]
    fn intervals_within_clips_to_window() {
        let within = intervals_within(&[iv(-500, 300), iv(7900, 9000), iv(9000, 9500)], 8000);
        assert_eq!(within, vec![iv(0, 300), iv(7900, 8000)]);
    }

    #[test]
    fn shift_intervals_moves_then_clips() {
        let shifted = shift_intervals(&[iv(500, 2500), iv(4500, 6500)], 500, 8000);
        assert_eq!(shifted, vec![iv(1000, 3000), iv(5000, 7000)]);

        let pushed_out = shift_intervals(&[iv(500, 2500)], -3000, 8000);
        assert!(pushed_out.is_empty());
    }

    #[test]
    fn zero_shift_matches_intervals_within() {
        let items = [iv(7000, 9000), iv(-10, 40), iv(30, 60)];
        assert_eq!(shift_intervals(&items, 0, 8000), intervals_within(&items, 8000));
    }

    #[test]
    fn nearest_distance_checks_both_neighbours() {
        let points = [1000, 2000, 4000];
        assert_eq!(nearest_distance_ms(&points, 1900), 100.0);
        assert_eq!(nearest_distance_ms(&points, 2900), 900.0);
        assert_eq!(nearest_distance_ms(&points, 0), 1000.0);
        assert_eq!(nearest_distance_ms(&points, 5000), 1000.0);
        assert_eq!(nearest_distance_ms(&points, 2000), 0.0);
    }

    #[test]
    fn nearest_distance_of_empty_list_is_infinite() {
        assert!(nearest_distance_ms(&[], 10).is_infinite());
    }

    #[test]
    fn boundary_closeness_decays_with_distance() {
        // 320ms away with a 320ms scale is exp(-1)
        let closeness = boundary_closeness(&[1320], &[1000], 320.0);
        assert!((closeness - (-1.0_f64).exp()).abs() < 1e-9);
        assert!((closeness - 0.3679).abs() < 1e-4);
    }

    #[test]
    fn boundary_closeness_exact_hit_is_one() {
        assert_eq!(boundary_closeness(&[4200], &[4200], 320.0), 1.0);
    }

    #[test]
    fn boundary_closeness_empty_is_zero() {
        assert_eq!(boundary_closeness(&[], &[1000], 320.0), 0.0);
        assert_eq!(boundary_closeness(&[1000], &[], 320.0), 0.0);
    }

    #[test]
    fn boundary_closeness_floors_scale_at_one() {
        let tiny = boundary_closeness(&[1001], &[1000], 0.0);
        assert!((tiny - (-1.0_f64).exp()).abs() < 1e-9);
    }
}
