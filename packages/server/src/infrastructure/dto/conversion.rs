//! Conversion logic between wire DTOs and domain types.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    ChatText, ConnectionId, DisplayName, InviteKind, QueueKind, RelayCommand, RelayEvent,
    RoomName, SignalKind, SignalPayload, UserDetail, ValueObjectError,
};
use crate::infrastructure::dto::websocket as dto;

/// Why an inbound frame was dropped.
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("frame is not a valid event envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid field for '{event}': {source}")]
    InvalidField {
        event: String,
        #[source]
        source: ValueObjectError,
    },
}

/// Decode one text frame into a command.
pub fn parse_client_frame(text: &str) -> Result<RelayCommand, InboundError> {
    let envelope: dto::ClientEnvelope =
        serde_json::from_str(text).map_err(InboundError::Malformed)?;
    RelayCommand::try_from(envelope)
}

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::ClientEnvelope> for RelayCommand {
    type Error = InboundError;

    fn try_from(envelope: dto::ClientEnvelope) -> Result<Self, Self::Error> {
        let dto::ClientEnvelope { event, data } = envelope;

        let command = match event.as_str() {
            "user:register" => {
                let p: dto::RegisterPayload = decode(&event, data)?;
                RelayCommand::RegisterIdentity {
                    name: field(&event, DisplayName::new(p.username))?,
                }
            }
            "users:list" => RelayCommand::ListUsers,
            "room:join" => {
                let p: dto::RoomJoinPayload = decode(&event, data)?;
                // a blank name is treated as absent rather than rejecting the join
                let name = p
                    .username
                    .and_then(|username| DisplayName::new(username).ok());
                RelayCommand::JoinRoom {
                    room: field(&event, RoomName::new(p.room))?,
                    name,
                }
            }
            "room:leave" => {
                let p: dto::RoomPayload = decode(&event, data)?;
                RelayCommand::LeaveRoom {
                    room: field(&event, RoomName::new(p.room))?,
                }
            }
            "rooms:list" => RelayCommand::ListRooms,
            "user:call" => {
                let p: dto::OfferPayload = decode(&event, data)?;
                signal(&event, p.to, SignalKind::CallOffer, p.offer)?
            }
            "call:accepted" => {
                let p: dto::AnswerPayload = decode(&event, data)?;
                signal(&event, p.to, SignalKind::CallAccepted, p.answer)?
            }
            "peer:nego:needed" => {
                let p: dto::OfferPayload = decode(&event, data)?;
                signal(&event, p.to, SignalKind::NegotiationNeeded, p.offer)?
            }
            "peer:nego:done" => {
                let p: dto::AnswerPayload = decode(&event, data)?;
                signal(&event, p.to, SignalKind::NegotiationDone, p.answer)?
            }
            "ice:candidate" => {
                let p: dto::CandidatePayload = decode(&event, data)?;
                signal(&event, p.to, SignalKind::IceCandidate, p.candidate)?
            }
            "chat:join" => {
                let p: dto::RoomPayload = decode(&event, data)?;
                RelayCommand::JoinChat {
                    room: field(&event, RoomName::new(p.room))?,
                }
            }
            "chat:message" => {
                let p: dto::ChatMessagePayload = decode(&event, data)?;
                RelayCommand::SendChat {
                    room: field(&event, RoomName::new(p.room))?,
                    text: field(&event, ChatText::new(p.message))?,
                }
            }
            "anon:chat:find" => RelayCommand::FindAnonymous(QueueKind::Chat),
            "anon:chat:leave" => RelayCommand::LeaveAnonymous(QueueKind::Chat),
            "anon:video:find" => RelayCommand::FindAnonymous(QueueKind::Video),
            "anon:video:leave" => RelayCommand::LeaveAnonymous(QueueKind::Video),
            "video:invite" => invite(&event, InviteKind::Video, decode(&event, data)?)?,
            "chat:invite" => invite(&event, InviteKind::Chat, decode(&event, data)?)?,
            "disconnect" => RelayCommand::Disconnect,
            _ => return Err(InboundError::UnknownEvent(event)),
        };
        Ok(command)
    }
}

fn decode<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, InboundError> {
    serde_json::from_value(data).map_err(|source| InboundError::InvalidPayload {
        event: event.to_string(),
        source,
    })
}

fn field<T>(event: &str, result: Result<T, ValueObjectError>) -> Result<T, InboundError> {
    result.map_err(|source| InboundError::InvalidField {
        event: event.to_string(),
        source,
    })
}

fn signal(
    event: &str,
    to: String,
    kind: SignalKind,
    payload: Value,
) -> Result<RelayCommand, InboundError> {
    Ok(RelayCommand::Signal {
        to: field(event, ConnectionId::new(to))?,
        kind,
        payload: SignalPayload::new(payload),
    })
}

fn invite(
    event: &str,
    kind: InviteKind,
    payload: dto::InvitePayload,
) -> Result<RelayCommand, InboundError> {
    Ok(RelayCommand::Invite {
        kind,
        to: field(event, DisplayName::new(payload.to_email))?,
        room: field(event, RoomName::new(payload.room))?,
    })
}

// ========================================
// Domain → DTO
// ========================================

impl From<UserDetail> for dto::UserDetailDto {
    fn from(detail: UserDetail) -> Self {
        Self {
            username: detail.name.into_string(),
            id: detail.connection_id.into_string(),
        }
    }
}

impl From<RelayEvent> for dto::ServerMessage {
    fn from(event: RelayEvent) -> Self {
        match event {
            RelayEvent::ConnectionReady { connection_id } => Self::ConnectionReady {
                id: connection_id.into_string(),
            },
            RelayEvent::UsersUpdated { users } => Self::UsersUpdate {
                users: users
                    .iter()
                    .map(|user| user.name.as_str().to_string())
                    .collect(),
                details: users.into_iter().map(Into::into).collect(),
            },
            RelayEvent::RoomsUpdated { rooms } => Self::RoomsUpdate {
                rooms: rooms.into_iter().map(RoomName::into_string).collect(),
            },
            RelayEvent::UserJoined {
                name,
                connection_id,
                ..
            } => Self::UserJoined {
                username: name.map(DisplayName::into_string),
                id: connection_id.into_string(),
            },
            RelayEvent::RoomJoined { room, name } => Self::RoomJoin {
                room: room.into_string(),
                username: name.map(DisplayName::into_string),
            },
            RelayEvent::ChatJoined { room } => Self::ChatJoined {
                room: room.into_string(),
            },
            RelayEvent::ChatMessage(message) => Self::ChatMessage {
                room: message.room.into_string(),
                from: message.from,
                from_id: message.from_id.into_string(),
                message: message.text.into_string(),
                at: message.at.value(),
            },
            RelayEvent::AnonChatCount { room, count } => Self::AnonChatCount {
                room: room.into_string(),
                count,
            },
            RelayEvent::Matched { kind, room } => match kind {
                QueueKind::Chat => Self::AnonChatMatched {
                    room: room.into_string(),
                },
                QueueKind::Video => Self::AnonVideoMatched {
                    room: room.into_string(),
                },
            },
            RelayEvent::Searching { kind } => match kind {
                QueueKind::Chat => Self::AnonChatSearching {},
                QueueKind::Video => Self::AnonVideoSearching {},
            },
            RelayEvent::AnonymousLeft { kind } => match kind {
                QueueKind::Chat => Self::AnonChatLeft {},
                QueueKind::Video => Self::AnonVideoLeft {},
            },
            RelayEvent::Signal {
                kind,
                from,
                payload,
            } => {
                let from = from.into_string();
                let payload = payload.into_value();
                match kind {
                    SignalKind::CallOffer => Self::IncomingCall {
                        from,
                        offer: payload,
                    },
                    SignalKind::CallAccepted => Self::CallAccepted {
                        from,
                        answer: payload.clone(),
                        ans: payload,
                    },
                    SignalKind::NegotiationNeeded => Self::NegotiationNeeded {
                        from,
                        offer: payload,
                    },
                    SignalKind::NegotiationDone => Self::NegotiationFinal {
                        from,
                        answer: payload.clone(),
                        ans: payload,
                    },
                    SignalKind::IceCandidate => Self::IceCandidate {
                        from,
                        candidate: payload,
                    },
                }
            }
            RelayEvent::Invite { kind, from, room } => match kind {
                InviteKind::Video => Self::VideoInvite {
                    from,
                    room: room.into_string(),
                },
                InviteKind::Chat => Self::ChatInvite {
                    from,
                    room: room.into_string(),
                },
            },
        }
    }
}
