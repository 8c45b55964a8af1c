//! Vote scoring engine
//!
//! Pure, synchronous functions over already-fetched rows:
//! - [`aggregate`]: features + votes → ranked [`FeatureWithVotes`]
//! - [`consensus`]: ranked results → team alignment and outlier features
//! - [`roles`]: role-joined vote rows → per-role profiles and cross-role agreement
//!
//! None of these touch I/O, and none mutate their inputs; every sort runs
//! on an owned copy.

pub mod aggregate;
pub mod consensus;
pub mod roles;

pub use aggregate::{aggregate_votes, AggregatedResults};
pub use consensus::{calculate_consensus_metrics, ConsensusMetrics};
pub use roles::{analyze_role_voting, RoleVotingProfile, TopFeature, VotingAnalysisResponse};

use crate::models::FeatureWithVotes;
use std::cmp::Ordering;

/// Ranking order: total points descending, then feature id ascending
pub(crate) fn rank_order(a: &FeatureWithVotes, b: &FeatureWithVotes) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| a.feature.id.cmp(&b.feature.id))
}

/// Population standard deviation. Zero for an empty slice.
pub(crate) fn population_std_dev(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}
