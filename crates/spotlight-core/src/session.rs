// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The spotlight session state machine.
//!
//! Exactly one session exists per community. Transitions:
//!
//! ```text
//! Idle --open_session--> Open --claim--> Claimed --close_and_deliver--> Idle
//! ```
//!
//! The `Claimed` phase owns the spotlighted participant and the ledger, so
//! "a participant is spotlighted iff the session is claimed" and "exactly
//! one ledger exists while claimed" hold by construction. Callers are
//! responsible for serializing access (the whole session is one critical
//! section); within that discipline every transition is a plain
//! compare-and-set on the phase, so the first of any set of racing claims
//! wins and the rest observe a typed rejection.

use crate::ledger::{ContributionLedger, LedgerSnapshot};
use crate::roster::RosterPolicy;
use crate::{Participant, ParticipantId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where a command originated: a private one-to-one channel with the
/// system, or the shared community channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Private one-to-one channel (DM).
    Direct,
    /// Shared multi-party channel.
    Community,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Community => f.write_str("community"),
        }
    }
}

/// Whether a compliment is attributed or anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionMode {
    /// Attributed to the contributor's display name.
    Public,
    /// Contributor identity discarded at record time.
    Anonymous,
}

impl fmt::Display for ContributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Anonymous => f.write_str("anonymous"),
        }
    }
}

/// Observable session state (a fieldless view of the phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No session is open.
    Idle,
    /// Session announced, awaiting a claimant.
    Open,
    /// A participant is spotlighted and accepting compliments.
    Claimed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Open => f.write_str("open"),
            Self::Claimed => f.write_str("claimed"),
        }
    }
}

/// Typed rejection for every session operation. All variants are
/// recoverable; the transport glue renders them as user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `open_session` while a session is already open or claimed.
    #[error("a spotlight session is already active")]
    SessionAlreadyActive,
    /// `claim` while no session is open.
    #[error("there is no open spotlight session to claim")]
    NoOpenSession,
    /// `claim` by a participant who has opted out.
    #[error("this participant has opted out of spotlights")]
    ParticipantOptedOut,
    /// `claim` while another participant already holds the spotlight.
    #[error("the spotlight is already claimed")]
    SpotlightAlreadyClaimed,
    /// `submit` while no participant is spotlighted.
    #[error("there is no active spotlight to compliment")]
    NoActiveSpotlight,
    /// `submit` with a mode/channel pairing the policy forbids.
    #[error("{mode} compliments cannot be sent from a {channel} channel")]
    WrongChannelForMode {
        /// The requested contribution mode.
        mode: ContributionMode,
        /// The channel the command originated from.
        channel: ChannelKind,
    },
    /// `claim_random` with no eligible candidate left after roster
    /// filtering.
    #[error("no eligible candidates for a random spotlight")]
    NoEligibleCandidates,
}

impl SessionError {
    /// Stable identifier for the wire (mirrors the variant, not the text).
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionAlreadyActive => "E_SESSION_ACTIVE",
            Self::NoOpenSession => "E_NO_OPEN_SESSION",
            Self::ParticipantOptedOut => "E_OPTED_OUT",
            Self::SpotlightAlreadyClaimed => "E_ALREADY_CLAIMED",
            Self::NoActiveSpotlight => "E_NO_SPOTLIGHT",
            Self::WrongChannelForMode { .. } => "E_WRONG_CHANNEL",
            Self::NoEligibleCandidates => "E_NO_CANDIDATES",
        }
    }
}

/// What `close_and_deliver` hands back when a claimed session closes: the
/// recipient and the full ledger snapshot. Emission to the delivery sinks
/// (DM + community broadcast) is the caller's job and is best-effort; a
/// failed send never re-enters the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// The participant who held the spotlight.
    pub recipient: Participant,
    /// Everything collected during the session.
    pub snapshot: LedgerSnapshot,
}

enum Phase {
    Idle,
    Open,
    Claimed {
        spotlight: Participant,
        ledger: ContributionLedger,
    },
}

/// The single spotlight session for a community, composing the opt-out
/// roster and (while claimed) the contribution ledger.
pub struct SpotlightSession {
    roster: RosterPolicy,
    phase: Phase,
}

impl Default for SpotlightSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotlightSession {
    /// Create a session in `Idle` with an empty roster.
    pub fn new() -> Self {
        Self {
            roster: RosterPolicy::new(),
            phase: Phase::Idle,
        }
    }

    /// Current observable state.
    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Open => SessionState::Open,
            Phase::Claimed { .. } => SessionState::Claimed,
        }
    }

    /// The spotlighted participant, present iff the session is claimed.
    pub fn spotlight(&self) -> Option<&Participant> {
        match &self.phase {
            Phase::Claimed { spotlight, .. } => Some(spotlight),
            _ => None,
        }
    }

    /// Exclude `id` from future selection. Survives session closure.
    pub fn opt_out(&mut self, id: ParticipantId) {
        self.roster.opt_out(id);
    }

    /// Restore `id`'s eligibility.
    pub fn opt_in(&mut self, id: ParticipantId) {
        self.roster.opt_in(id);
    }

    /// True iff `id` may claim the spotlight.
    pub fn is_eligible(&self, id: ParticipantId) -> bool {
        self.roster.is_eligible(id)
    }

    /// Announce a new session: `Idle -> Open`.
    ///
    /// Rejects with `SessionAlreadyActive` when a session is already open
    /// or claimed, so an overlapping announcement cannot double-open.
    pub fn open_session(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Open;
                Ok(())
            }
            Phase::Open | Phase::Claimed { .. } => Err(SessionError::SessionAlreadyActive),
        }
    }

    /// Claim the open session: `Open -> Claimed`. First claim wins.
    ///
    /// A claim while `Idle` is `NoOpenSession`; while already claimed it is
    /// the more informative `SpotlightAlreadyClaimed`. Opted-out
    /// participants are rejected with `ParticipantOptedOut` before any
    /// state change.
    pub fn claim(&mut self, participant: Participant) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle => Err(SessionError::NoOpenSession),
            Phase::Claimed { .. } => Err(SessionError::SpotlightAlreadyClaimed),
            Phase::Open => {
                if !self.roster.is_eligible(participant.id) {
                    return Err(SessionError::ParticipantOptedOut);
                }
                self.phase = Phase::Claimed {
                    spotlight: participant,
                    ledger: ContributionLedger::new(),
                };
                Ok(())
            }
        }
    }

    /// Pick an eligible candidate uniformly at random and claim for them.
    ///
    /// This is an alternate producer of a [`claim`](Self::claim) call with
    /// a system-chosen candidate, not a separate state machine: every
    /// precondition of `claim` still applies. Returns the chosen
    /// participant on success.
    pub fn claim_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        candidates: &[Participant],
    ) -> Result<Participant, SessionError> {
        let eligible: Vec<&Participant> = candidates
            .iter()
            .filter(|p| self.roster.is_eligible(p.id))
            .collect();
        let chosen = eligible
            .choose(rng)
            .ok_or(SessionError::NoEligibleCandidates)?;
        let chosen = (*chosen).clone();
        self.claim(chosen.clone())?;
        Ok(chosen)
    }

    /// Record a compliment for the spotlighted participant.
    ///
    /// Valid only while claimed. The mode/channel pairing is a hard rule:
    /// anonymous compliments are accepted only from a direct channel,
    /// public ones only from the community channel. A rejected submission
    /// leaves the ledger untouched. No dedup and no self-compliment check
    /// (documented behavior carried over from the original bot).
    pub fn submit(
        &mut self,
        contributor: &Participant,
        channel: ChannelKind,
        mode: ContributionMode,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        let Phase::Claimed { ledger, .. } = &mut self.phase else {
            return Err(SessionError::NoActiveSpotlight);
        };
        match (mode, channel) {
            (ContributionMode::Anonymous, ChannelKind::Direct) => {
                ledger.record_anonymous(text);
                Ok(())
            }
            (ContributionMode::Public, ChannelKind::Community) => {
                ledger.record_public(contributor.display_name.clone(), text);
                Ok(())
            }
            (mode, channel) => Err(SessionError::WrongChannelForMode { mode, channel }),
        }
    }

    /// Close the session and reset to `Idle`, returning the delivery when
    /// there was a claimant.
    ///
    /// Valid in any state. When `Idle` or `Open` there is nothing to
    /// deliver and the reset is an idempotent no-op apart from dropping an
    /// unclaimed announcement. Infallible by design: delivery-sink
    /// failures are not this state machine's concern.
    pub fn close_and_deliver(&mut self) -> Option<Delivery> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Claimed {
                spotlight,
                mut ledger,
            } => Some(Delivery {
                recipient: spotlight,
                snapshot: ledger.snapshot_and_clear(),
            }),
            Phase::Idle | Phase::Open => None,
        }
    }

    /// Administrative out-of-cycle restart: close (delivering if claimed)
    /// and immediately re-open. The open cannot fail after the reset.
    pub fn force_reopen(&mut self) -> Option<Delivery> {
        let delivery = self.close_and_deliver();
        // Idle after the reset, so this cannot reject.
        let _ = self.open_session();
        delivery
    }
}
