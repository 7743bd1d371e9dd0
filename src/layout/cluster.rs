//! One-dimensional clustering primitives.
//!
//! Line grouping and column-slot grouping both reduce to clustering numbers
//! on a single axis. These functions take explicit tolerances and plain
//! numeric input so they can be tested without a page.

use std::ops::Range;

use crate::model::Token;

/// Median of the values, or `None` when empty.
///
/// For an even count the mean of the two middle values is returned.
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// A group of nearby positions on one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionCluster {
    /// Mean of the member positions
    pub center: f32,
    /// Smallest member position
    pub min: f32,
    /// Largest member position
    pub max: f32,
    /// Indices into the input slice, ascending by position
    pub members: Vec<usize>,
}

impl PositionCluster {
    /// Number of member positions.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Single-linkage clustering of positions.
///
/// Positions are visited in ascending order; a position joins the current
/// cluster when its distance to the previous position is at most
/// `link_tolerance`. Clusters come back ordered by position.
pub fn cluster_positions(values: &[f32], link_tolerance: f32) -> Vec<PositionCluster> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut clusters: Vec<PositionCluster> = Vec::new();
    let mut prev: Option<f32> = None;

    for idx in order {
        let value = values[idx];
        let joins = matches!(prev, Some(p) if value - p <= link_tolerance);
        match clusters.last_mut() {
            Some(current) if joins => {
                current.members.push(idx);
                current.max = value;
            }
            _ => clusters.push(PositionCluster {
                center: value,
                min: value,
                max: value,
                members: vec![idx],
            }),
        }
        prev = Some(value);
    }

    for cluster in &mut clusters {
        let sum: f32 = cluster.members.iter().map(|&i| values[i]).sum();
        cluster.center = sum / cluster.members.len() as f32;
    }

    clusters
}

/// Index of the slot closest to `x`.
///
/// When two slots are equally close the leftward one (lower index, slots
/// being sorted ascending) wins. Returns `None` when there are no slots.
pub fn nearest_slot(x: f32, slots: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &slot) in slots.iter().enumerate() {
        let dist = (x - slot).abs();
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Group `(baseline, left)` keys into lines.
///
/// Keys are visited by baseline (ties by left edge). A key joins the current
/// line when its baseline differs from the line's first baseline by strictly
/// less than `tolerance`. Lines are returned top to bottom, members left to
/// right, as indices into `keys`.
pub fn group_baselines(keys: &[(f32, f32)], tolerance: f32) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| {
        keys[a]
            .0
            .total_cmp(&keys[b].0)
            .then(keys[a].1.total_cmp(&keys[b].1))
            .then(a.cmp(&b))
    });

    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut anchor: Option<f32> = None;

    for idx in order {
        let baseline = keys[idx].0;
        let same_line = matches!(anchor, Some(a) if (baseline - a).abs() < tolerance);
        match lines.last_mut() {
            Some(line) if same_line => line.push(idx),
            _ => {
                lines.push(vec![idx]);
                anchor = Some(baseline);
            }
        }
    }

    for line in &mut lines {
        line.sort_by(|&a, &b| keys[a].1.total_cmp(&keys[b].1).then(a.cmp(&b)));
    }

    lines
}

/// Group tokens into lines by baseline proximity.
pub fn group_lines(tokens: &[Token], tolerance: f32) -> Vec<Vec<usize>> {
    let keys: Vec<(f32, f32)> = tokens.iter().map(|t| (t.baseline, t.left())).collect();
    group_baselines(&keys, tolerance)
}

/// Split left-sorted intervals into runs separated by wide gaps.
///
/// A new run starts when an interval begins at least `min_gap` after the
/// furthest right edge seen so far in the current run.
pub fn split_on_gaps(intervals: &[(f32, f32)], min_gap: f32) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    if intervals.is_empty() {
        return runs;
    }

    let mut start = 0;
    let mut reach = intervals[0].1;
    for (i, &(left, right)) in intervals.iter().enumerate().skip(1) {
        if left - reach >= min_gap {
            runs.push(start..i);
            start = i;
            reach = right;
        } else {
            reach = reach.max(right);
        }
    }
    runs.push(start..intervals.len());
    runs
}

/// Population mean and standard deviation.
pub(crate) fn mean_and_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_cluster_positions_merges_within_tolerance() {
        let values = [100.0, 12.0, 10.0, 205.0, 98.0, 11.0];
        let clusters = cluster_positions(&values, 5.0);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].members, vec![2, 5, 1]);
        assert!((clusters[0].center - 11.0).abs() < 1e-4);
        assert_eq!(clusters[1].len(), 2);
        assert_eq!(clusters[2].members, vec![3]);
    }

    #[test]
    fn test_cluster_positions_chains() {
        // Each step is within tolerance, so the chain forms one cluster.
        let clusters = cluster_positions(&[0.0, 4.0, 8.0, 12.0], 4.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].min, 0.0);
        assert_eq!(clusters[0].max, 12.0);
    }

    #[test]
    fn test_cluster_positions_empty() {
        assert!(cluster_positions(&[], 1.0).is_empty());
    }

    #[test]
    fn test_nearest_slot() {
        let slots = [10.0, 50.0, 90.0];
        assert_eq!(nearest_slot(12.0, &slots), Some(0));
        assert_eq!(nearest_slot(61.0, &slots), Some(1));
        assert_eq!(nearest_slot(500.0, &slots), Some(2));
        assert_eq!(nearest_slot(1.0, &[]), None);
    }

    #[test]
    fn test_nearest_slot_tie_goes_left() {
        assert_eq!(nearest_slot(30.0, &[10.0, 50.0]), Some(0));
        assert_eq!(nearest_slot(70.0, &[10.0, 50.0, 90.0]), Some(1));
    }

    #[test]
    fn test_group_baselines() {
        let keys = [
            (100.0, 50.0),
            (40.0, 80.0),
            (41.5, 10.0),
            (99.0, 5.0),
            (70.0, 1.0),
        ];
        let lines = group_baselines(&keys, 3.0);
        assert_eq!(lines, vec![vec![2, 1], vec![4], vec![3, 0]]);
    }

    #[test]
    fn test_group_baselines_strict_tolerance() {
        // A difference equal to the tolerance starts a new line.
        let lines = group_baselines(&[(10.0, 0.0), (13.0, 5.0)], 3.0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_split_on_gaps() {
        let intervals = [(0.0, 20.0), (24.0, 40.0), (80.0, 100.0), (103.0, 120.0)];
        let runs = split_on_gaps(&intervals, 10.0);
        assert_eq!(runs, vec![0..2, 2..4]);
        assert!(split_on_gaps(&[], 10.0).is_empty());
    }

    #[test]
    fn test_mean_and_std() {
        let (mean, std) = mean_and_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-5);
        assert!((std - 2.0).abs() < 1e-5);
    }
}
