//! Vote aggregation
//!
//! Sums each feature's allocated points and counts its vote rows, then
//! ranks the features. Duplicate vote rows are not collapsed; storage
//! enforces one row per (player, feature).

use std::collections::HashMap;

use serde::Serialize;

use super::rank_order;
use crate::models::{Feature, FeatureWithVotes, Vote};

/// Response body for the results endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResults {
    pub results: Vec<FeatureWithVotes>,
    /// Number of vote rows that went into the results
    pub total_votes: usize,
}

impl AggregatedResults {
    pub fn new(features: &[Feature], votes: &[Vote]) -> Self {
        Self {
            results: aggregate_votes(features, votes),
            total_votes: votes.len(),
        }
    }
}

/// Combine features and votes into ranked results
///
/// Every input feature appears exactly once, zero-vote features included.
/// Votes referencing a feature that is not in `features` are ignored.
/// Output is sorted by total points descending, ties broken by feature id.
pub fn aggregate_votes(features: &[Feature], votes: &[Vote]) -> Vec<FeatureWithVotes> {
    let mut tallies: HashMap<&str, (u64, usize)> = HashMap::new();
    for vote in votes {
        let entry = tallies.entry(vote.feature_id.as_str()).or_insert((0, 0));
        entry.0 += u64::from(vote.points_allocated);
        entry.1 += 1;
    }

    let mut results: Vec<FeatureWithVotes> = features
        .iter()
        .map(|feature| {
            let (total_points, vote_count) = tallies
                .get(feature.id.as_str())
                .copied()
                .unwrap_or((0, 0));
            FeatureWithVotes {
                feature: feature.clone(),
                total_points,
                vote_count,
            }
        })
        .collect();

    results.sort_by(rank_order);
    results
}
