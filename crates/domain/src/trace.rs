use serde::Serialize;

/// Structured trace events emitted across all clubbot crates.
///
/// Each variant is logged as a single `tracing::info!` call carrying the
/// serialized event under the `trace_event` field, so a log pipeline can
/// index on `event` without parsing free-text messages.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TenantLoaded {
        club_id: String,
        members: usize,
        roles: usize,
    },
    TenantResolved {
        sender_id: String,
        club_id: String,
        rule: &'static str,
    },
    SessionCreated {
        sender_id: String,
    },
    RoundStarted {
        club_id: String,
        round_number: u64,
        roles_offered: usize,
        roles_unfilled: usize,
    },
    RoleOffered {
        club_id: String,
        round_number: u64,
        role: String,
        candidate_id: String,
    },
    RoleAccepted {
        club_id: String,
        round_number: u64,
        role: String,
        member_id: String,
    },
    RoleRejected {
        club_id: String,
        round_number: u64,
        role: String,
        member_id: String,
        reselected: bool,
    },
    RoleExhausted {
        club_id: String,
        round_number: u64,
        role: String,
    },
    RoundCanceled {
        club_id: String,
        round_number: u64,
    },
    RoundReset {
        club_id: String,
        round_number: u64,
    },
    CycleReset {
        club_id: String,
        member_id: String,
    },
    MemberAdded {
        club_id: String,
        member_id: String,
    },
    MemberRemoved {
        club_id: String,
        member_id: String,
    },
    SendFailed {
        club_id: String,
        destination_id: String,
        reason: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cb_event");
    }
}
