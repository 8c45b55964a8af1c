//! Consensus metrics over ranked results
//!
//! Team alignment measures how concentrated points are on the top three
//! features. Controversial features draw more voters than average but fewer
//! points; unanimous winners have many voters relative to their points and
//! score above average.

use serde::Serialize;

use super::rank_order;
use crate::models::FeatureWithVotes;

/// How many top features count toward team alignment
const ALIGNMENT_TOP_N: usize = 3;

/// Maximum number of controversial features reported
const MAX_CONTROVERSIAL: usize = 3;

/// Ratio of voters to points at or above which a feature is unanimous
const UNANIMOUS_VOTER_RATIO: f64 = 0.8;

/// Derived agreement metrics for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusMetrics {
    /// 0-100, share of all points held by the top three features
    pub team_alignment: u32,
    pub consensus_leader: Option<FeatureWithVotes>,
    pub controversial_features: Vec<FeatureWithVotes>,
    pub unanimous_winners: Vec<FeatureWithVotes>,
}

impl ConsensusMetrics {
    fn empty() -> Self {
        Self {
            team_alignment: 0,
            consensus_leader: None,
            controversial_features: Vec::new(),
            unanimous_winners: Vec::new(),
        }
    }
}

/// Compute consensus metrics from aggregated results
///
/// `results` need not be sorted; ranking happens on a copy. The
/// controversial and unanimous filters run over `results` in the order given.
pub fn calculate_consensus_metrics(results: &[FeatureWithVotes]) -> ConsensusMetrics {
    if results.is_empty() {
        return ConsensusMetrics::empty();
    }

    let mut sorted = results.to_vec();
    sorted.sort_by(rank_order);

    let total_points: u64 = results.iter().map(|r| r.total_points).sum();
    let top_points: u64 = sorted
        .iter()
        .take(ALIGNMENT_TOP_N)
        .map(|r| r.total_points)
        .sum();
    let concentration = if total_points == 0 {
        0.0
    } else {
        top_points as f64 / total_points as f64
    };
    let team_alignment = (concentration * 100.0).round() as u32;

    let n = results.len() as f64;
    let avg_vote_count = results.iter().map(|r| r.vote_count as f64).sum::<f64>() / n;
    let avg_points = total_points as f64 / n;

    let controversial_features: Vec<FeatureWithVotes> = results
        .iter()
        .filter(|r| r.vote_count as f64 > avg_vote_count && (r.total_points as f64) < avg_points)
        .take(MAX_CONTROVERSIAL)
        .cloned()
        .collect();

    let unanimous_winners: Vec<FeatureWithVotes> = results
        .iter()
        .filter(|r| {
            r.vote_count as f64 >= r.total_points as f64 * UNANIMOUS_VOTER_RATIO
                && r.total_points as f64 > avg_points
        })
        .cloned()
        .collect();

    ConsensusMetrics {
        team_alignment,
        consensus_leader: sorted.into_iter().next(),
        controversial_features,
        unanimous_winners,
    }
}
