// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opt-out roster policy: the membership gate applied before claiming.

use crate::ParticipantId;
use std::collections::HashSet;

/// Tracks which participants have opted out of being spotlighted.
///
/// Membership is idempotent in both directions and survives session
/// closure; only explicit `opt_out`/`opt_in` calls mutate it.
#[derive(Debug, Clone, Default)]
pub struct RosterPolicy {
    opted_out: HashSet<ParticipantId>,
}

impl RosterPolicy {
    /// Create an empty policy (everyone eligible).
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude `id` from future spotlight selection. Idempotent.
    pub fn opt_out(&mut self, id: ParticipantId) {
        self.opted_out.insert(id);
    }

    /// Restore `id`'s eligibility. Removing an absent id is a no-op.
    pub fn opt_in(&mut self, id: ParticipantId) {
        self.opted_out.remove(&id);
    }

    /// True iff `id` has not opted out. Pure query.
    pub fn is_eligible(&self, id: ParticipantId) -> bool {
        !self.opted_out.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_out_is_idempotent() {
        let mut roster = RosterPolicy::new();
        roster.opt_out(7);
        roster.opt_out(7);
        assert!(!roster.is_eligible(7));
        roster.opt_in(7);
        assert!(roster.is_eligible(7));
    }

    #[test]
    fn opt_in_on_absent_id_is_a_no_op() {
        let mut roster = RosterPolicy::new();
        roster.opt_in(42);
        assert!(roster.is_eligible(42));
    }
}
