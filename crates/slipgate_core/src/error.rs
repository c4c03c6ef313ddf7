//! Error types for the dispatch core.

use thiserror::Error;

/// Player resolution failures.
///
/// "Player no longer exists" is an expected condition, not an exceptional
/// one: callers check it explicitly instead of letting it propagate into
/// the host callback.
#[derive(Debug, Clone, Error)]
pub enum PlayerError {
    #[error("no connected player in client slot {0}")]
    NonexistentClient(i32),
    #[error("no connected player with steam id {0}")]
    NonexistentSteamId(u64),
    #[error("no connected player named {0:?}")]
    NonexistentName(String),
}

/// Stats feed transport and decode failures. Either kind triggers a full
/// listener reinitialization rather than a stop.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("undecodable feed record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// An unrecognized team label in wire text.
#[derive(Debug, Clone, Error)]
#[error("unrecognized team label {0:?}")]
pub struct TeamParseError(pub String);
