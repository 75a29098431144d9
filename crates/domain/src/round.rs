//! Round ledger types — the persisted shape of `state.json`.
//!
//! These are plain data; the transitions between them (start/accept/reject/
//! defer/cancel/reset) live in `cb-round`, which is the only code allowed to
//! mutate a `RoundState` so invariants I1-I3 stay enforced in one place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A role currently offered to one candidate, awaiting their reply.
/// `accepted` is carried in the wire format for backward compatibility with
/// prior releases but is always `false` while the entry lives in `pending`
/// (invariant I2: a role is in `pending` XOR `accepted`, never both).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOffer {
    pub candidate: String,
    #[serde(default)]
    pub declined_by: Vec<String>,
    #[serde(default)]
    pub accepted: bool,
}

/// A role resolved by acceptance. The member's name is denormalized here so
/// summaries can render without joining back to the catalog (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedRole {
    pub waid: String,
    pub name: String,
}

/// Per-club round ledger, persisted across restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundState {
    #[serde(rename = "round")]
    pub round_number: u64,
    #[serde(default)]
    pub pending: HashMap<String, PendingOffer>,
    #[serde(default)]
    pub accepted: HashMap<String, AcceptedRole>,
    #[serde(default)]
    pub members_cycle: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub last_summary: Option<String>,
    #[serde(default)]
    pub canceled: bool,
}

impl RoundState {
    /// The role (if any) currently offered to `member_id`.
    pub fn pending_role_for(&self, member_id: &str) -> Option<&str> {
        self.pending
            .iter()
            .find(|(_, offer)| offer.candidate == member_id)
            .map(|(role, _)| role.as_str())
    }

    /// All member ids currently holding a pending offer or an accepted role
    /// this round — the baseline exclusion set for re-selection (I1).
    pub fn busy_member_ids(&self) -> std::collections::HashSet<String> {
        let mut ids: std::collections::HashSet<String> =
            self.pending.values().map(|o| o.candidate.clone()).collect();
        ids.extend(self.accepted.values().map(|a| a.waid.clone()));
        ids
    }

    /// True once every role is either accepted or exhausted (absent from
    /// both maps, recorded only via the "no candidate" notification).
    pub fn is_clean_for_new_round(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_role_for_finds_candidate() {
        let mut rs = RoundState::default();
        rs.pending.insert(
            "R1".into(),
            PendingOffer { candidate: "42".into(), declined_by: vec![], accepted: false },
        );
        assert_eq!(rs.pending_role_for("42"), Some("R1"));
        assert_eq!(rs.pending_role_for("99"), None);
    }

    #[test]
    fn busy_member_ids_spans_pending_and_accepted() {
        let mut rs = RoundState::default();
        rs.pending.insert(
            "R1".into(),
            PendingOffer { candidate: "1".into(), declined_by: vec![], accepted: false },
        );
        rs.accepted.insert("R2".into(), AcceptedRole { waid: "2".into(), name: "Beto".into() });
        let busy = rs.busy_member_ids();
        assert!(busy.contains("1"));
        assert!(busy.contains("2"));
        assert_eq!(busy.len(), 2);
    }
}
