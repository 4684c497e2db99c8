use thiserror::Error;

/// Fatal conditions that abort an encode invocation outright (§7).
///
/// Everything else — a compression fallback, a padded selector, a missing
/// finder match — is a [`crate::pipeline::Warning`] attached to the output
/// record, not an `Err` here.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("payload is missing or empty")]
    EmptyPayload,

    #[error("carrier record could not be parsed: {0}")]
    InvalidCarrier(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
