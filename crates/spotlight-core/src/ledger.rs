// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-session contribution ledger (public + anonymous compliments).

use serde::{Deserialize, Serialize};

/// A public compliment, labeled with the contributor's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicEntry {
    /// Display name of the contributor at submission time.
    pub author: String,
    /// The compliment text, verbatim.
    pub text: String,
}

/// Ordered store of compliments for the *current* session only.
///
/// Entries are append-only and never deduplicated; order is submission
/// order. Anonymous entries discard the contributor identity at record
/// time — that is an invariant, not an omission.
#[derive(Debug, Default)]
pub struct ContributionLedger {
    public: Vec<PublicEntry>,
    anonymous: Vec<String>,
}

/// Both sequences of a ledger, taken at delivery time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Public compliments in submission order.
    pub public: Vec<PublicEntry>,
    /// Anonymous compliments in submission order; no contributor label.
    pub anonymous: Vec<String>,
}

impl LedgerSnapshot {
    /// True when both sequences are empty.
    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.anonymous.is_empty()
    }
}

impl ContributionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a public compliment labeled with `author`.
    pub fn record_public(&mut self, author: impl Into<String>, text: impl Into<String>) {
        self.public.push(PublicEntry {
            author: author.into(),
            text: text.into(),
        });
    }

    /// Append an anonymous compliment. The contributor identity is not
    /// taken and therefore cannot leak into the snapshot.
    pub fn record_anonymous(&mut self, text: impl Into<String>) {
        self.anonymous.push(text.into());
    }

    /// Total number of recorded entries across both sequences.
    pub fn len(&self) -> usize {
        self.public.len() + self.anonymous.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.anonymous.is_empty()
    }

    /// Take both sequences and leave the ledger empty.
    ///
    /// Callers must hold the session's critical section across this call so
    /// no concurrent record lands between the take and the reset; used
    /// exactly once, at delivery.
    pub fn snapshot_and_clear(&mut self) -> LedgerSnapshot {
        LedgerSnapshot {
            public: std::mem::take(&mut self.public),
            anonymous: std::mem::take(&mut self.anonymous),
        }
    }
}
