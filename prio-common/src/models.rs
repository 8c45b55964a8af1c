//! Domain models
//!
//! Persisted records (sessions, features, players, votes) plus the derived
//! shapes the scoring engine produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ========================================
// Sessions
// ========================================

/// Lifecycle of a voting session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Host is still adding features; no votes accepted
    Draft,
    /// Participants may join and allocate points
    Active,
    /// Voting closed; results are final
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Draft => "draft",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    /// Status changes only move forward: draft → active → completed.
    /// A draft may also be closed directly.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Draft, SessionStatus::Active)
                | (SessionStatus::Draft, SessionStatus::Completed)
                | (SessionStatus::Active, SessionStatus::Completed)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SessionStatus::Draft),
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// A single voting event with its own features, players and votes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub status: SessionStatus,
    /// Points each voter may distribute across the session's features
    pub points_budget: u32,
    /// Opaque credential for host-only operations. Never serialized.
    #[serde(skip)]
    pub host_token: String,
    pub created_at: DateTime<Utc>,
}

// ========================================
// Features
// ========================================

/// Kind of resource a reference link points at, detected from its URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Figma,
    Github,
    Jira,
    Notion,
    GoogleDocs,
    Miro,
    Other,
}

impl LinkType {
    /// Classify a URL by its host
    ///
    /// A domain matches itself or any subdomain of it, never a host that
    /// merely ends with the same characters.
    pub fn detect(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        let authority = lower
            .split_once("://")
            .map_or(lower.as_str(), |(_, rest)| rest)
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("");
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let host = host_port.split(':').next().unwrap_or(host_port);

        let on = |domain: &str| host_matches(host, domain);

        if on("figma.com") {
            LinkType::Figma
        } else if on("github.com") {
            LinkType::Github
        } else if on("atlassian.net") || host.split('.').next() == Some("jira") {
            LinkType::Jira
        } else if on("notion.so") || on("notion.site") {
            LinkType::Notion
        } else if host == "docs.google.com" || host == "drive.google.com" {
            LinkType::GoogleDocs
        } else if on("miro.com") {
            LinkType::Miro
        } else {
            LinkType::Other
        }
    }
}

/// `host` is `domain` itself or a subdomain of it
fn host_matches(host: &str, domain: &str) -> bool {
    host.strip_suffix(domain)
        .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('.'))
}

/// External link attached to a feature. Display-only; never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLink {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(rename = "type")]
    pub link_type: LinkType,
}

impl ReferenceLink {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        let url = url.into();
        let link_type = LinkType::detect(&url);
        Self {
            url,
            title,
            favicon: None,
            link_type,
        }
    }
}

/// A prioritizable item within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub session_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effort: Option<i64>,
    #[serde(default)]
    pub impact: Option<i64>,
    #[serde(default)]
    pub reference_links: Vec<ReferenceLink>,
}

impl Feature {
    /// Bare feature with no ratings or links
    pub fn new(id: impl Into<String>, session_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            session_id: session_id.into(),
            title: title.into(),
            description: None,
            effort: None,
            impact: None,
            reference_links: Vec::new(),
        }
    }
}

// ========================================
// Players and votes
// ========================================

/// A session participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub session_id: String,
    pub name: String,
    /// Free-text role (Product Manager, Designer, Engineer, ...)
    #[serde(default)]
    pub role: Option<String>,
}

/// One participant's point allocation to one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub session_id: String,
    pub player_id: String,
    pub feature_id: String,
    pub points_allocated: u32,
}

/// A vote joined with the feature and player it references
///
/// Produced once at the data-access boundary so role analysis works on a
/// typed row instead of loosely shaped join output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteWithContext {
    pub feature_id: String,
    pub feature_title: String,
    pub player_id: String,
    pub player_name: String,
    pub player_role: Option<String>,
    pub points_allocated: u32,
}

// ========================================
// Derived results
// ========================================

/// A feature extended with its aggregated vote totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWithVotes {
    #[serde(flatten)]
    pub feature: Feature,
    pub total_points: u64,
    pub vote_count: usize,
}
