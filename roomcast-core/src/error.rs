use crate::model::EnvelopeKind;
use thiserror::Error;

/// Failures while turning wire text into envelopes or envelopes into typed signals.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid envelope json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0:?} envelope has no payload")]
    MissingPayload(EnvelopeKind),

    #[error("{kind:?} envelope has a malformed payload: {source}")]
    MalformedPayload {
        kind: EnvelopeKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind:?} envelope is missing the `{field}` field")]
    MissingField {
        kind: EnvelopeKind,
        field: &'static str,
    },
}
