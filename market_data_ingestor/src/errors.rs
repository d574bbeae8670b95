use thiserror::Error;

/// Failure to decode a snapshot payload as a whole.
///
/// Per-symbol shape problems are not reported here; they surface when the
/// individual record is read from a [`SnapshotSet`](crate::providers::alpaca_rest::SnapshotSet).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid JSON.
    #[error("snapshot payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is valid JSON but not an object keyed by symbol.
    #[error("snapshot payload must be a JSON object keyed by symbol, got {0}")]
    NotAnObject(&'static str),
}
