//! Kinds of messages the signaling router relays between peers.

/// Call-setup message relayed verbatim from one connection to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Initial call offer.
    CallOffer,
    /// Answer to an initial offer.
    CallAccepted,
    /// Renegotiation offer.
    NegotiationNeeded,
    /// Answer to a renegotiation offer.
    NegotiationDone,
    /// Trickled ICE candidate.
    IceCandidate,
}

/// Best-effort invitation addressed to a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InviteKind {
    Video,
    Chat,
}
