//! Markov abstraction of an object-centric directly-follows graph
//!
//! Annotates every directly-follows edge of every per-type DFG with transition
//! probabilities and derives a pairwise similarity matrix between object types, based on
//! the L1 distance of their probability profiles.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use super::ocdfg_struct::OCDirectlyFollowsGraph;

/// Normalization direction of a Markov edge probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Normalized by the total ingoing frequency of the edge target
    In,
    /// Normalized by the total outgoing frequency of the edge source
    Out,
    /// Normalized by the sum of both
    InOut,
}

impl Direction {
    /// All directions
    pub const ALL: [Direction; 3] = [Direction::In, Direction::Out, Direction::InOut];
}

/// Markov probabilities of one directly-follows edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeProbability {
    /// Edge frequency divided by the total ingoing frequency of the target
    pub input: f64,
    /// Edge frequency divided by the total outgoing frequency of the source
    pub output: f64,
    /// Edge frequency divided by the sum of both
    pub inout: f64,
}

impl EdgeProbability {
    /// The probability for the given [`Direction`]
    pub fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::In => self.input,
            Direction::Out => self.output,
            Direction::InOut => self.inout,
        }
    }
}

///
/// Markov abstraction of an [`OCDirectlyFollowsGraph`]
///
#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkovOCDFG {
    /// Per object type: Markov probabilities of every directly-follows edge
    #[serde_as(as = "HashMap<_, Vec<(_, _)>>")]
    pub edge_probabilities: HashMap<String, HashMap<(String, String), EdgeProbability>>,
    /// Union of all activities over the per-type graphs
    pub activities: HashSet<String>,
}

impl MarkovOCDFG {
    /// Compute the Markov abstraction of an [`OCDirectlyFollowsGraph`]
    pub fn discover(ocdfg: &OCDirectlyFollowsGraph<'_>) -> Self {
        let mut edge_probabilities = HashMap::new();
        for (ob_type, dfg) in &ocdfg.object_type_to_dfg {
            let mut ingoing_sums: HashMap<&str, u32> = HashMap::new();
            let mut outgoing_sums: HashMap<&str, u32> = HashMap::new();
            for ((from, to), frequency) in &dfg.directly_follows_relations {
                *outgoing_sums.entry(from.as_ref()).or_default() += frequency;
                *ingoing_sums.entry(to.as_ref()).or_default() += frequency;
            }
            let probabilities: HashMap<(String, String), EdgeProbability> = dfg
                .directly_follows_relations
                .iter()
                .map(|((from, to), frequency)| {
                    let frequency = f64::from(*frequency);
                    let ingoing = f64::from(ingoing_sums[to.as_ref()]);
                    let outgoing = f64::from(outgoing_sums[from.as_ref()]);
                    (
                        (from.to_string(), to.to_string()),
                        EdgeProbability {
                            input: frequency / ingoing,
                            output: frequency / outgoing,
                            inout: frequency / (ingoing + outgoing),
                        },
                    )
                })
                .collect();
            edge_probabilities.insert(ob_type.clone(), probabilities);
        }
        Self {
            edge_probabilities,
            activities: ocdfg
                .all_activities()
                .into_iter()
                .map(|a| a.to_string())
                .collect(),
        }
    }

    /// The Markov probability of the edge `(a1, a2)` for an object type (0 if absent)
    pub fn probability(&self, object_type: &str, a1: &str, a2: &str, direction: Direction) -> f64 {
        self.edge_probabilities
            .get(object_type)
            .and_then(|edges| edges.get(&(a1.to_string(), a2.to_string())))
            .map(|p| p.get(direction))
            .unwrap_or(0.0)
    }

    /// Compute the pairwise [`SimilarityMatrix`] between all object types
    ///
    /// For every direction and object type pair, the L1 distance of their edge
    /// probability profiles is computed over all activity pairs and normalized by the
    /// maximum distance of that direction: `1 - diff / max_diff`, rounded to
    /// `precision_round` decimal places.
    pub fn similarity_matrix(&self, precision_round: i32) -> SimilarityMatrix {
        let object_types: Vec<&String> = self.edge_probabilities.keys().collect();
        let activities: Vec<&String> = self.activities.iter().collect();

        let mut values = HashMap::new();
        for direction in Direction::ALL {
            let diffs: Vec<((String, String), f64)> = object_types
                .iter()
                .cartesian_product(object_types.iter())
                .collect::<Vec<_>>()
                .into_par_iter()
                .map(|(ot1, ot2)| {
                    let mut diff = 0.0;
                    for a1 in &activities {
                        for a2 in &activities {
                            diff += (self.probability(ot1, a1, a2, direction)
                                - self.probability(ot2, a1, a2, direction))
                            .abs();
                        }
                    }
                    (
                        ((*ot1).clone(), (*ot2).clone()),
                        round_to(diff, precision_round),
                    )
                })
                .collect();

            let max_diff = diffs
                .iter()
                .map(|(_, d)| *d)
                .fold(0.0_f64, f64::max);
            for ((ot1, ot2), diff) in diffs {
                let similarity = if max_diff > 0.0 {
                    round_to(1.0 - diff / max_diff, precision_round)
                } else {
                    1.0
                };
                values.insert((ot1, ot2, direction), similarity);
            }
        }
        SimilarityMatrix { values }
    }
}

pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10_f64.powi(digits);
    (value * factor).round() / factor
}

///
/// Pairwise similarity of object types, per [`Direction`]
///
/// Values are in `[0, 1]`, with 1 meaning identical Markov probability profiles.
///
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    /// Similarity per (object type, object type, direction)
    #[serde_as(as = "Vec<(_, _)>")]
    pub values: HashMap<(String, String, Direction), f64>,
}

impl SimilarityMatrix {
    /// The similarity of two object types in the given direction (`None` if unknown)
    pub fn get(&self, ot1: &str, ot2: &str, direction: Direction) -> Option<f64> {
        self.values
            .get(&(ot1.to_string(), ot2.to_string(), direction))
            .copied()
    }

    /// All entries of the given direction with a similarity of at least `threshold`
    pub fn filter(&self, threshold: f64, direction: Direction) -> Vec<(&str, &str, f64)> {
        let mut entries: Vec<_> = self
            .values
            .iter()
            .filter(|((_, _, d), v)| *d == direction && **v >= threshold)
            .map(|((a, b, _), v)| (a.as_str(), b.as_str(), *v))
            .collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfg::DirectlyFollowsGraph;

    fn two_type_ocdfg() -> OCDirectlyFollowsGraph<'static> {
        let mut ocdfg = OCDirectlyFollowsGraph::new();

        // a -> b (3), a -> c (1)
        let mut dfg1 = DirectlyFollowsGraph::new();
        dfg1.add_activity("a".into(), 4);
        dfg1.add_activity("b".into(), 3);
        dfg1.add_activity("c".into(), 1);
        dfg1.add_df_relation("a".into(), "b".into(), 3);
        dfg1.add_df_relation("a".into(), "c".into(), 1);
        ocdfg.object_type_to_dfg.insert("order".into(), dfg1);

        // identical profile, scaled frequencies
        let mut dfg2 = DirectlyFollowsGraph::new();
        dfg2.add_activity("a".into(), 8);
        dfg2.add_activity("b".into(), 6);
        dfg2.add_activity("c".into(), 2);
        dfg2.add_df_relation("a".into(), "b".into(), 6);
        dfg2.add_df_relation("a".into(), "c".into(), 2);
        ocdfg.object_type_to_dfg.insert("item".into(), dfg2);

        // different profile
        let mut dfg3 = DirectlyFollowsGraph::new();
        dfg3.add_activity("b".into(), 1);
        dfg3.add_activity("c".into(), 1);
        dfg3.add_df_relation("c".into(), "b".into(), 1);
        ocdfg.object_type_to_dfg.insert("payment".into(), dfg3);

        ocdfg
    }

    #[test]
    fn markov_probabilities_are_normalized() {
        let markov = MarkovOCDFG::discover(&two_type_ocdfg());
        assert_eq!(markov.probability("order", "a", "b", Direction::Out), 0.75);
        assert_eq!(markov.probability("order", "a", "c", Direction::Out), 0.25);
        assert_eq!(markov.probability("order", "a", "b", Direction::In), 1.0);
        assert_eq!(
            markov.probability("order", "a", "b", Direction::InOut),
            3.0 / 7.0
        );
        // Absent edges have probability 0
        assert_eq!(markov.probability("order", "b", "a", Direction::Out), 0.0);
        assert_eq!(markov.probability("unknown", "a", "b", Direction::Out), 0.0);
    }

    #[test]
    fn similarity_is_one_for_identical_profiles() {
        let markov = MarkovOCDFG::discover(&two_type_ocdfg());
        let matrix = markov.similarity_matrix(2);
        // "order" and "item" have identical probability profiles
        assert_eq!(matrix.get("order", "item", Direction::Out), Some(1.0));
        assert_eq!(matrix.get("order", "order", Direction::Out), Some(1.0));
        // "payment" is maximally dissimilar to them
        assert_eq!(matrix.get("order", "payment", Direction::Out), Some(0.0));
    }

    #[test]
    fn filter_keeps_entries_at_or_above_threshold() {
        let markov = MarkovOCDFG::discover(&two_type_ocdfg());
        let matrix = markov.similarity_matrix(2);
        let filtered = matrix.filter(0.9, Direction::Out);
        assert!(filtered
            .iter()
            .all(|(_, _, v)| *v >= 0.9));
        assert!(filtered
            .iter()
            .any(|(a, b, _)| *a == "order" && *b == "item"));
        assert!(!filtered
            .iter()
            .any(|(a, b, _)| *a == "order" && *b == "payment"));
    }
}
