//! Role-based voting analysis
//!
//! Groups role-joined vote rows by the voter's role, profiles each group,
//! and scores how much the roles agree on their top features using pairwise
//! Jaccard similarity.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::population_std_dev;
use crate::models::VoteWithContext;

/// Role label for players who did not give one
pub const UNKNOWN_ROLE: &str = "Unknown";

/// Number of features kept in each role's `top_features`
const TOP_FEATURES_PER_ROLE: usize = 5;

/// A feature as ranked within one role group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopFeature {
    pub feature_id: String,
    pub feature_title: String,
    pub total_points: u64,
    /// Number of vote rows from this role for the feature
    pub voter_count: usize,
}

/// Voting statistics for one role
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleVotingProfile {
    pub role: String,
    /// Distinct players in this role who voted
    pub player_count: usize,
    /// Vote rows cast by this role
    pub total_votes: usize,
    /// Mean points over every vote row in the group
    pub average_points_per_feature: f64,
    pub top_features: Vec<TopFeature>,
    /// Population standard deviation of the group's allocations
    pub voting_variance: f64,
}

/// Response body for the voting-analysis endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingAnalysisResponse {
    pub role_profiles: Vec<RoleVotingProfile>,
    /// Population standard deviation over all vote rows
    pub overall_variance: f64,
    /// 0-100 mean pairwise Jaccard similarity of role top-feature sets
    pub consensus_score: f64,
}

impl VotingAnalysisResponse {
    fn empty() -> Self {
        Self {
            role_profiles: Vec::new(),
            overall_variance: 0.0,
            consensus_score: 0.0,
        }
    }
}

/// Rows for one role, plus a per-feature breakdown in first-seen order
struct RoleGroup<'a> {
    role: String,
    rows: Vec<&'a VoteWithContext>,
    features: Vec<FeatureTally<'a>>,
    feature_index: HashMap<&'a str, usize>,
}

struct FeatureTally<'a> {
    feature_id: &'a str,
    feature_title: &'a str,
    points: Vec<u32>,
}

impl<'a> RoleGroup<'a> {
    fn new(role: String) -> Self {
        Self {
            role,
            rows: Vec::new(),
            features: Vec::new(),
            feature_index: HashMap::new(),
        }
    }

    fn push(&mut self, row: &'a VoteWithContext) {
        self.rows.push(row);
        let idx = match self.feature_index.get(row.feature_id.as_str()) {
            Some(&idx) => idx,
            None => {
                self.features.push(FeatureTally {
                    feature_id: &row.feature_id,
                    feature_title: &row.feature_title,
                    points: Vec::new(),
                });
                let idx = self.features.len() - 1;
                self.feature_index.insert(&row.feature_id, idx);
                idx
            }
        };
        self.features[idx].points.push(row.points_allocated);
    }

    fn into_profile(self) -> RoleVotingProfile {
        let player_count = self
            .rows
            .iter()
            .map(|r| r.player_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut ranked: Vec<TopFeature> = self
            .features
            .iter()
            .map(|f| TopFeature {
                feature_id: f.feature_id.to_string(),
                feature_title: f.feature_title.to_string(),
                total_points: f.points.iter().map(|&p| u64::from(p)).sum(),
                voter_count: f.points.len(),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.feature_id.cmp(&b.feature_id))
        });
        ranked.truncate(TOP_FEATURES_PER_ROLE);

        let points: Vec<u32> = self.rows.iter().map(|r| r.points_allocated).collect();
        let average_points_per_feature = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|&p| p as f64).sum::<f64>() / points.len() as f64
        };

        RoleVotingProfile {
            role: self.role,
            player_count,
            total_votes: self.rows.len(),
            average_points_per_feature,
            top_features: ranked,
            voting_variance: population_std_dev(&points),
        }
    }
}

/// Normalize a missing or blank role to [`UNKNOWN_ROLE`]
pub fn normalize_role(role: Option<&str>) -> String {
    match role.map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => UNKNOWN_ROLE.to_string(),
    }
}

/// Profile votes by voter role and score cross-role agreement
///
/// Role profiles appear in the order each role is first seen in `rows`.
pub fn analyze_role_voting(rows: &[VoteWithContext]) -> VotingAnalysisResponse {
    if rows.is_empty() {
        return VotingAnalysisResponse::empty();
    }

    let mut groups: Vec<RoleGroup<'_>> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let role = normalize_role(row.player_role.as_deref());
        let idx = match group_index.get(&role) {
            Some(&idx) => idx,
            None => {
                groups.push(RoleGroup::new(role.clone()));
                group_index.insert(role, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[idx].push(row);
    }

    let role_profiles: Vec<RoleVotingProfile> =
        groups.into_iter().map(RoleGroup::into_profile).collect();

    let all_points: Vec<u32> = rows.iter().map(|r| r.points_allocated).collect();

    VotingAnalysisResponse {
        consensus_score: cross_role_consensus(&role_profiles),
        overall_variance: population_std_dev(&all_points),
        role_profiles,
    }
}

/// Mean pairwise Jaccard similarity (0-100) of the roles' top-feature sets
///
/// Zero when fewer than two roles voted. A pair whose sets are both empty
/// contributes 0 and still counts toward the mean.
fn cross_role_consensus(profiles: &[RoleVotingProfile]) -> f64 {
    if profiles.len() < 2 {
        return 0.0;
    }

    let sets: Vec<HashSet<&str>> = profiles
        .iter()
        .map(|p| p.top_features.iter().map(|f| f.feature_id.as_str()).collect())
        .collect();

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            total += jaccard_percent(&sets[i], &sets[j]);
            pairs += 1;
        }
    }

    total / pairs as f64
}

fn jaccard_percent(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    100.0 * intersection as f64 / union as f64
}
