//! Submission validation
//!
//! Everything that reaches storage passes through here first, so the
//! scoring engine can trust its rows: points are within budget, every
//! allocation targets a feature of the same session, and each feature
//! appears at most once per voter.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{Feature, Session, SessionStatus};

/// Inclusive bounds for effort and impact ratings
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 10;

/// Default per-voter point budget
pub const DEFAULT_POINTS_BUDGET: u32 = 100;

/// Points a voter assigns to one feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointAllocation {
    pub feature_id: String,
    pub points: u32,
}

/// Trimmed, non-empty text or the given error
fn non_empty(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn validate_session_name(name: &str) -> Result<String, ValidationError> {
    non_empty(name, ValidationError::EmptySessionName)
}

pub fn validate_player_name(name: &str) -> Result<String, ValidationError> {
    non_empty(name, ValidationError::EmptyPlayerName)
}

pub fn validate_feature_title(title: &str) -> Result<String, ValidationError> {
    non_empty(title, ValidationError::EmptyTitle)
}

/// Check an optional effort/impact rating against [`RATING_MIN`]..=[`RATING_MAX`]
pub fn validate_rating(field: &'static str, value: Option<i64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(RATING_MIN..=RATING_MAX).contains(&v) => Err(ValidationError::RatingOutOfRange {
            field,
            value: v,
            min: RATING_MIN,
            max: RATING_MAX,
        }),
        _ => Ok(()),
    }
}

/// Features may only be added or removed while the session is a draft
pub fn ensure_session_editable(session: &Session) -> Result<(), ValidationError> {
    if session.status == SessionStatus::Draft {
        Ok(())
    } else {
        Err(ValidationError::SessionNotEditable)
    }
}

pub fn validate_status_transition(
    from: SessionStatus,
    to: SessionStatus,
) -> Result<(), ValidationError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ValidationError::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Validate a voter's full allocation for a session
///
/// Returns the entries worth storing: zero-point entries are dropped so
/// they do not count as votes.
pub fn validate_allocation(
    session: &Session,
    features: &[Feature],
    allocation: &[PointAllocation],
) -> Result<Vec<PointAllocation>, ValidationError> {
    if session.status != SessionStatus::Active {
        return Err(ValidationError::SessionNotAcceptingVotes {
            status: session.status.to_string(),
        });
    }

    let known: HashSet<&str> = features
        .iter()
        .filter(|f| f.session_id == session.id)
        .map(|f| f.id.as_str())
        .collect();

    let mut seen = HashSet::new();
    let mut allocated: u64 = 0;
    for entry in allocation {
        if !known.contains(entry.feature_id.as_str()) {
            return Err(ValidationError::UnknownFeature(entry.feature_id.clone()));
        }
        if !seen.insert(entry.feature_id.as_str()) {
            return Err(ValidationError::DuplicateFeature(entry.feature_id.clone()));
        }
        allocated += u64::from(entry.points);
    }

    if allocated > u64::from(session.points_budget) {
        return Err(ValidationError::OverBudget {
            allocated,
            budget: session.points_budget,
        });
    }

    Ok(allocation
        .iter()
        .filter(|entry| entry.points > 0)
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(status: SessionStatus) -> Session {
        Session {
            id: "s1".to_string(),
            name: "Roadmap".to_string(),
            status,
            points_budget: DEFAULT_POINTS_BUDGET,
            host_token: "t".to_string(),
            created_at: Utc::now(),
        }
    }

    fn features() -> Vec<Feature> {
        vec![
            Feature::new("f1", "s1", "A"),
            Feature::new("f2", "s1", "B"),
            Feature::new("other", "s2", "Elsewhere"),
        ]
    }

    fn alloc(feature_id: &str, points: u32) -> PointAllocation {
        PointAllocation {
            feature_id: feature_id.to_string(),
            points,
        }
    }

    #[test]
    fn test_names_trimmed_and_required() {
        assert_eq!(validate_session_name("  Q3  ").unwrap(), "Q3");
        assert_eq!(validate_session_name("   "), Err(ValidationError::EmptySessionName));
        assert_eq!(validate_player_name(""), Err(ValidationError::EmptyPlayerName));
        assert_eq!(validate_feature_title("\t"), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating("effort", None).is_ok());
        assert!(validate_rating("effort", Some(1)).is_ok());
        assert!(validate_rating("impact", Some(10)).is_ok());
        assert!(matches!(
            validate_rating("impact", Some(11)),
            Err(ValidationError::RatingOutOfRange { field: "impact", value: 11, .. })
        ));
        assert!(validate_rating("effort", Some(0)).is_err());
    }

    #[test]
    fn test_valid_allocation_drops_zero_entries() {
        let stored = validate_allocation(
            &session(SessionStatus::Active),
            &features(),
            &[alloc("f1", 70), alloc("f2", 0)],
        )
        .unwrap();
        assert_eq!(stored, vec![alloc("f1", 70)]);
    }

    #[test]
    fn test_allocation_over_budget() {
        let err = validate_allocation(
            &session(SessionStatus::Active),
            &features(),
            &[alloc("f1", 70), alloc("f2", 31)],
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::OverBudget { allocated: 101, budget: 100 });
    }

    #[test]
    fn test_allocation_exactly_at_budget() {
        assert!(validate_allocation(
            &session(SessionStatus::Active),
            &features(),
            &[alloc("f1", 70), alloc("f2", 30)],
        )
        .is_ok());
    }

    #[test]
    fn test_allocation_rejects_foreign_and_duplicate_features() {
        let active = session(SessionStatus::Active);
        assert_eq!(
            validate_allocation(&active, &features(), &[alloc("other", 10)]),
            Err(ValidationError::UnknownFeature("other".to_string()))
        );
        assert_eq!(
            validate_allocation(&active, &features(), &[alloc("f1", 10), alloc("f1", 5)]),
            Err(ValidationError::DuplicateFeature("f1".to_string()))
        );
    }

    #[test]
    fn test_allocation_requires_active_session() {
        for status in [SessionStatus::Draft, SessionStatus::Completed] {
            assert!(matches!(
                validate_allocation(&session(status), &features(), &[alloc("f1", 10)]),
                Err(ValidationError::SessionNotAcceptingVotes { .. })
            ));
        }
    }

    #[test]
    fn test_status_transition_validation() {
        assert!(validate_status_transition(SessionStatus::Draft, SessionStatus::Active).is_ok());
        assert_eq!(
            validate_status_transition(SessionStatus::Completed, SessionStatus::Draft),
            Err(ValidationError::InvalidStatusTransition {
                from: "completed".to_string(),
                to: "draft".to_string(),
            })
        );
    }

    #[test]
    fn test_features_editable_only_in_draft() {
        assert!(ensure_session_editable(&session(SessionStatus::Draft)).is_ok());
        assert_eq!(
            ensure_session_editable(&session(SessionStatus::Active)),
            Err(ValidationError::SessionNotEditable)
        );
    }
}
