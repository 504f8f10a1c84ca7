// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Spotlight session core.
//!
//! One community, one spotlight session at a time: the session is opened,
//! a participant claims it (or is picked at random), others contribute
//! compliments publicly or anonymously, and after the collection window the
//! ledger is delivered and the session resets. This crate holds the pure
//! state machine; transport, scheduling, and presentation live elsewhere.

pub mod ledger;
pub mod roster;
pub mod session;

pub use ledger::{ContributionLedger, LedgerSnapshot, PublicEntry};
pub use roster::RosterPolicy;
pub use session::{
    ChannelKind, ContributionMode, Delivery, SessionError, SessionState, SpotlightSession,
};

use serde::{Deserialize, Serialize};

/// Stable participant identifier (assigned by the chat transport).
pub type ParticipantId = u64;

/// An externally supplied participant identity. The core never creates or
/// destroys participants; it only references them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable id, unique within the community.
    pub id: ParticipantId,
    /// Name shown on public contributions and announcements.
    pub display_name: String,
}

impl Participant {
    /// Convenience constructor.
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}
