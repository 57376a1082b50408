//! Error types for the ranking engine.
//!
//! The scorer and the fusion step are total over validated input and never
//! fail. Errors only show up at the boundaries: configuration updates, tool
//! snapshots coming in from callers, unknown sort strategies, and the search
//! collaborators.

use thiserror::Error;

/// Errors produced at the ranking engine's input boundaries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    /// A ranking configuration (or an update to one) carries out-of-range values.
    #[error("invalid ranking config: {0}")]
    InvalidConfig(String),

    /// A tool snapshot carries out-of-range values.
    #[error("invalid tool snapshot: {0}")]
    InvalidTool(String),

    /// No configuration is registered under this name.
    #[error("unknown ranking config: {0}")]
    UnknownConfig(String),

    /// A legacy `ranking_type` string that maps to no sort strategy.
    #[error("unknown ranking type: {0}")]
    UnknownSortStrategy(String),

    /// A keyword or semantic search collaborator failed.
    #[error("search backend error: {0}")]
    Search(String),
}

impl RankingError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        RankingError::InvalidConfig(msg.into())
    }

    pub fn invalid_tool<S: Into<String>>(msg: S) -> Self {
        RankingError::InvalidTool(msg.into())
    }

    pub fn search<S: Into<String>>(msg: S) -> Self {
        RankingError::Search(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
