//! Clustering of object types by Markov similarity
//!
//! Object types are clustered by thresholding the similarity matrix: every pair at or
//! above the threshold ends up in the same cluster, merging clusters transitively. A
//! bisection-based tuning explores the threshold space and reports, per reachable
//! cluster count, the minimal threshold producing it.

use std::collections::{BTreeMap, HashSet};

use super::markov::{Direction, SimilarityMatrix};

///
/// Cluster object types by thresholding the similarity matrix
///
/// Every similarity entry of `direction` with a value of at least `threshold` places its
/// two object types in the same cluster; clusters connected through shared members are
/// merged. Object types without any entry at or above the threshold are not part of any
/// cluster.
///
pub fn discover_clusters(
    matrix: &SimilarityMatrix,
    threshold: f64,
    direction: Direction,
) -> Vec<HashSet<String>> {
    let mut clusters: Vec<HashSet<String>> = Vec::new();
    for (ot1, ot2, _) in matrix.filter(threshold, direction) {
        let matching: Vec<usize> = clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.contains(ot1) || c.contains(ot2))
            .map(|(i, _)| i)
            .collect();
        match matching.as_slice() {
            [] => {
                clusters.push(vec![ot1.to_string(), ot2.to_string()].into_iter().collect());
            }
            [index] => {
                clusters[*index].insert(ot1.to_string());
                clusters[*index].insert(ot2.to_string());
            }
            [first, rest @ ..] => {
                // Merge all matching clusters into the first one
                let mut merged = std::mem::take(&mut clusters[*first]);
                for index in rest {
                    merged.extend(std::mem::take(&mut clusters[*index]));
                }
                merged.insert(ot1.to_string());
                merged.insert(ot2.to_string());
                clusters[*first] = merged;
                clusters.retain(|c| !c.is_empty());
            }
        }
    }
    clusters
}

// Thresholds are explored in hundredths so they can be used as exact map keys
const THRESHOLD_SCALE: u32 = 100;

fn threshold_of(hundredths: u32) -> f64 {
    f64::from(hundredths) / f64::from(THRESHOLD_SCALE)
}

///
/// Explore the threshold space of [`discover_clusters`] by recursive bisection
///
/// Starting from the extremes 0.0 and 1.0 (plus 0.5), an interval is bisected whenever
/// the cluster counts at its endpoints differ, until no interval with differing counts
/// remains unexplored. Returns the clustering per explored threshold (in hundredths,
/// i.e. key 75 is threshold 0.75).
///
pub fn tune_thresholds(
    matrix: &SimilarityMatrix,
    direction: Direction,
) -> BTreeMap<u32, Vec<HashSet<String>>> {
    let mut explored: BTreeMap<u32, Vec<HashSet<String>>> = BTreeMap::new();
    explored.insert(0, discover_clusters(matrix, 0.0, direction));
    explored.insert(
        THRESHOLD_SCALE,
        discover_clusters(matrix, 1.0, direction),
    );
    tune_at(matrix, direction, THRESHOLD_SCALE / 2, &mut explored);
    explored
}

fn tune_at(
    matrix: &SimilarityMatrix,
    direction: Direction,
    threshold: u32,
    explored: &mut BTreeMap<u32, Vec<HashSet<String>>>,
) {
    if explored.contains_key(&threshold) {
        return;
    }
    let clusters = discover_clusters(matrix, threshold_of(threshold), direction);
    let cluster_count = clusters.len();
    explored.insert(threshold, clusters);

    let upper = explored
        .range(threshold + 1..)
        .next()
        .map(|(k, v)| (*k, v.len()));
    let lower = explored
        .range(..threshold)
        .next_back()
        .map(|(k, v)| (*k, v.len()));

    if let Some((upper_threshold, upper_count)) = upper {
        if cluster_count != upper_count && upper_threshold > threshold + 1 {
            tune_at(matrix, direction, (threshold + upper_threshold) / 2, explored);
        }
    }
    if let Some((lower_threshold, lower_count)) = lower {
        if cluster_count != lower_count && threshold > lower_threshold + 1 {
            tune_at(matrix, direction, (threshold + lower_threshold) / 2, explored);
        }
    }
}

///
/// The minimal explored threshold per reachable cluster count
///
/// Runs [`tune_thresholds`] and keeps, for every distinct cluster count, the smallest
/// threshold producing it.
///
pub fn minimal_thresholds_per_cluster_count(
    matrix: &SimilarityMatrix,
    direction: Direction,
) -> BTreeMap<usize, f64> {
    let mut result: BTreeMap<usize, f64> = BTreeMap::new();
    for (threshold, clusters) in tune_thresholds(matrix, direction) {
        result
            .entry(clusters.len())
            .or_insert_with(|| threshold_of(threshold));
    }
    result
}
