mod description;
mod envelope;
mod payload;
mod peer;
mod room;
mod signaling;

pub use description::{IceCandidate, SdpType, SessionDescription};
pub use envelope::{Envelope, EnvelopeKind};
pub use payload::{
    AnswerPayload, CandidatePayload, ErrorCode, ErrorPayload, JoinPayload, OfferPayload, Signal,
};
pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::IceServerConfig;
