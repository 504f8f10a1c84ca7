// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire schema for the spotlight hub: client commands, hub replies and
//! notifications, carried in deterministic CBOR packets (see [`wire`]).

pub use spotlight_core::{
    ChannelKind, ContributionMode, Delivery, LedgerSnapshot, Participant, ParticipantId,
    PublicEntry, SessionState,
};

pub mod wire;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Unix socket path for the spotlight hub.
///
/// Prefers a per-user runtime dir (XDG_RUNTIME_DIR) and falls back to `/tmp`
/// when unavailable.
pub fn default_socket_path() -> PathBuf {
    let base = std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join("spotlight.sock")
}

/// Canonical OpEnvelope carried as the payload of a packet.
///
/// * `op` – operation name (e.g., "claim", "reply").
/// * `ts` – logical timestamp (authoritative on the hub side).
/// * `payload` – operation specific body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpEnvelope<P> {
    /// Operation name.
    pub op: String,
    /// Logical timestamp (monotonic per-hub clock).
    pub ts: u64,
    /// Operation-specific body.
    pub payload: P,
}

/// Reply status for command acknowledgements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AckStatus {
    /// Command accepted.
    Ok,
    /// Command rejected; see the error info.
    Error,
}

/// Machine-readable error info carried in rejecting replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Stable identifier (e.g., "E_ALREADY_CLAIMED").
    pub name: String,
    /// Human readable message.
    pub message: String,
}

/// Acknowledgement for a single command (hub → client).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyPayload {
    /// Outcome of the command.
    pub status: AckStatus,
    /// Optional human-readable confirmation text.
    pub message: Option<String>,
    /// Present iff `status == Error`.
    pub error: Option<ErrorInfo>,
}

impl ReplyPayload {
    /// Build an accepting reply with an optional confirmation line.
    pub fn ok(message: impl Into<Option<String>>) -> Self {
        Self {
            status: AckStatus::Ok,
            message: message.into(),
            error: None,
        }
    }

    /// Build a rejecting reply from a stable name and message.
    pub fn err(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Error,
            message: None,
            error: Some(ErrorInfo {
                name: name.into(),
                message: message.into(),
            }),
        }
    }
}

/// Identity announcement (client → hub). A connection is anonymous until
/// it says hello; identity-bearing commands are rejected before that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HelloPayload {
    /// Who is speaking on this connection.
    pub participant: Participant,
}

/// A compliment submission (client → hub).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplimentPayload {
    /// Channel the command originated from; the hub enforces the
    /// mode/channel pairing (anonymous ⇔ direct, public ⇔ community).
    pub channel: ChannelKind,
    /// Attributed or anonymous.
    pub mode: ContributionMode,
    /// The compliment text.
    pub text: String,
}

/// Current session state as reported to a `status` query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusReportPayload {
    /// Observable state of the session.
    pub state: SessionState,
    /// The spotlighted participant, present iff claimed.
    pub spotlight: Option<Participant>,
}

/// Notification severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotifyKind {
    /// Informational notification.
    Info,
    /// Warning notification.
    Warn,
}

/// Broadcast notification (announcements, claim congratulations, the
/// community-side rendering of a delivery).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Severity of the notification.
    pub kind: NotifyKind,
    /// Short title line.
    pub title: String,
    /// Optional details.
    pub body: Option<String>,
}

/// Commands a client may send to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Announce the connection's identity.
    Hello(HelloPayload),
    /// Announce a new session (admin / scheduler-equivalent).
    OpenSession,
    /// Claim the open session for the connection's participant.
    Claim,
    /// Ask the hub to pick an eligible connected participant at random.
    ClaimRandom,
    /// Submit a compliment for the spotlighted participant.
    Compliment(ComplimentPayload),
    /// Opt back into spotlight selection.
    OptIn,
    /// Opt out of spotlight selection.
    OptOut,
    /// Close the session, delivering any collected compliments.
    CloseSession,
    /// Close-and-deliver, then immediately re-open (admin).
    Reopen,
    /// Query the current session state.
    Status,
}

/// Messages the hub sends to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Acknowledgement of the most recent command on this connection.
    Reply(ReplyPayload),
    /// Response to a `status` query.
    Status(StatusReportPayload),
    /// Broadcast notification.
    Notification(Notification),
    /// The DM-side delivery to the spotlighted participant.
    Delivery(Delivery),
}
