use crate::error::CodecError;
use crate::model::description::{IceCandidate, SessionDescription};
use crate::model::payload::{
    AnswerPayload, CandidatePayload, ErrorCode, ErrorPayload, JoinPayload, OfferPayload, Signal,
};
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    Join,
    PeerJoined,
    PeerLeft,
    Offer,
    Answer,
    Candidate,
    /// Application data relayed between peers as-is.
    Message,
    Leave,
    Ping,
    Pong,
    Error,
}

/// The unit exchanged through the relay.
///
/// The relay routes on `type`, `from` and `to` and never looks inside `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,

    #[serde(
        default,
        alias = "room",
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub room_id: Option<RoomId>,

    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<PeerId>,

    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub to: Option<PeerId>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

fn non_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(T::from))
}

/// Older clients send the description or candidate as a top-level field named after
/// the envelope type. Moves it under `payload` unless a payload is already present.
fn promote_legacy_payload(value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    let key = match object.get("type").and_then(Value::as_str) {
        Some(key @ ("offer" | "answer" | "candidate")) => key.to_owned(),
        _ => return,
    };
    if object.get("payload").is_some_and(|payload| !payload.is_null()) {
        object.remove(&key);
        return;
    }
    if let Some(legacy) = object.remove(&key).filter(|legacy| !legacy.is_null()) {
        let mut payload = Map::new();
        payload.insert(key, legacy);
        object.insert("payload".to_owned(), Value::Object(payload));
    }
}

impl Envelope {
    fn bare(kind: EnvelopeKind) -> Self {
        Self {
            kind,
            room_id: None,
            from: None,
            to: None,
            payload: Value::Null,
        }
    }

    pub fn join(room_id: RoomId, peers: Vec<PeerId>) -> Self {
        Self {
            room_id: Some(room_id),
            payload: json!(JoinPayload { peers }),
            ..Self::bare(EnvelopeKind::Join)
        }
    }

    pub fn peer_joined(room_id: RoomId, peer_id: PeerId) -> Self {
        Self {
            room_id: Some(room_id),
            from: Some(peer_id),
            payload: json!({}),
            ..Self::bare(EnvelopeKind::PeerJoined)
        }
    }

    pub fn peer_left(room_id: RoomId, peer_id: PeerId) -> Self {
        Self {
            room_id: Some(room_id),
            from: Some(peer_id),
            payload: json!({}),
            ..Self::bare(EnvelopeKind::PeerLeft)
        }
    }

    pub fn offer(from: PeerId, to: Option<PeerId>, offer: SessionDescription) -> Self {
        Self {
            from: Some(from),
            to,
            payload: json!(OfferPayload { offer }),
            ..Self::bare(EnvelopeKind::Offer)
        }
    }

    pub fn answer(from: PeerId, to: PeerId, answer: SessionDescription) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            payload: json!(AnswerPayload { answer }),
            ..Self::bare(EnvelopeKind::Answer)
        }
    }

    pub fn candidate(from: PeerId, to: Option<PeerId>, candidate: IceCandidate) -> Self {
        Self {
            from: Some(from),
            to,
            payload: json!(CandidatePayload { candidate }),
            ..Self::bare(EnvelopeKind::Candidate)
        }
    }

    pub fn error(room_id: RoomId, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            room_id: Some(room_id),
            payload: json!(ErrorPayload {
                code,
                message: message.into(),
            }),
            ..Self::bare(EnvelopeKind::Error)
        }
    }

    pub fn message(from: PeerId, to: Option<PeerId>, data: Value) -> Self {
        Self {
            from: Some(from),
            to,
            payload: data,
            ..Self::bare(EnvelopeKind::Message)
        }
    }

    pub fn leave() -> Self {
        Self::bare(EnvelopeKind::Leave)
    }

    pub fn ping() -> Self {
        Self::bare(EnvelopeKind::Ping)
    }

    pub fn pong(room_id: RoomId) -> Self {
        Self {
            room_id: Some(room_id),
            ..Self::bare(EnvelopeKind::Pong)
        }
    }

    pub fn decode(text: &str) -> Result<Self, CodecError> {
        let mut value: Value = serde_json::from_str(text)?;
        promote_legacy_payload(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    pub fn encode(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Fills `roomId` and `from` from the sending connection when the client left them out.
    pub fn stamped(mut self, room_id: &RoomId, from: &PeerId) -> Self {
        if self.room_id.is_none() {
            self.room_id = Some(room_id.clone());
        }
        if self.from.is_none() {
            self.from = Some(from.clone());
        }
        self
    }

    /// Interprets the payload according to `type`.
    pub fn signal(&self) -> Result<Signal, CodecError> {
        let signal = match self.kind {
            EnvelopeKind::Join => Signal::Join(self.parse_payload()?),
            EnvelopeKind::PeerJoined => Signal::PeerJoined {
                peer: self.require_from()?,
            },
            EnvelopeKind::PeerLeft => Signal::PeerLeft {
                peer: self.require_from()?,
            },
            EnvelopeKind::Offer => {
                let OfferPayload { offer } = self.parse_payload()?;
                Signal::Offer {
                    from: self.require_from()?,
                    description: offer,
                }
            }
            EnvelopeKind::Answer => {
                let AnswerPayload { answer } = self.parse_payload()?;
                Signal::Answer {
                    from: self.require_from()?,
                    description: answer,
                }
            }
            EnvelopeKind::Candidate => {
                let CandidatePayload { candidate } = self.parse_payload()?;
                Signal::Candidate {
                    from: self.require_from()?,
                    candidate,
                }
            }
            EnvelopeKind::Message => Signal::Message {
                from: self.from.clone(),
                data: self.payload.clone(),
            },
            EnvelopeKind::Error => Signal::Error(self.parse_payload()?),
            EnvelopeKind::Leave => Signal::Leave,
            EnvelopeKind::Ping => Signal::Ping,
            EnvelopeKind::Pong => Signal::Pong,
        };
        Ok(signal)
    }

    fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        if self.payload.is_null() {
            return Err(CodecError::MissingPayload(self.kind));
        }
        T::deserialize(&self.payload).map_err(|source| CodecError::MalformedPayload {
            kind: self.kind,
            source,
        })
    }

    fn require_from(&self) -> Result<PeerId, CodecError> {
        self.from.clone().ok_or(CodecError::MissingField {
            kind: self.kind,
            field: "from",
        })
    }
}
