//! # Prioritization Common Library
//!
//! Shared code for the workshop prioritization service including:
//! - Domain models (sessions, features, players, votes)
//! - Vote aggregation and consensus scoring
//! - CSV export with formula-injection protection
//! - Submission validation
//! - Database schema and queries
//! - Configuration loading
//! - Session event types and SSE helpers

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod export;
pub mod models;
pub mod scoring;
pub mod sse;
pub mod validation;

pub use error::{Error, Result, ValidationError};
pub use models::{Feature, FeatureWithVotes, Player, Session, SessionStatus, Vote, VoteWithContext};
