//! Plain string rendering for outbound messages. No templating engine: the
//! engine's contract is silent on exact wording, so these are the shortest
//! strings that say what happened.

use cb_domain::{Catalog, RoundState};

pub fn offer_text(role: &str, member_name: &str) -> String {
    format!("{member_name}, you've been offered the role of {role}. Reply ACCEPT, REJECT, or DEFER.")
}

pub fn no_candidate_text(role: &str) -> String {
    format!("No eligible candidate was found for the role of {role}.")
}

pub fn exhausted_text(role: &str) -> String {
    format!("The role of {role} has no remaining candidates this round.")
}

pub fn defer_ack_text(role: &str) -> String {
    format!("Your offer for {role} stays open; reply ACCEPT or REJECT whenever you're ready.")
}

pub fn summary_text(state: &RoundState) -> String {
    let mut roles: Vec<&String> = state.accepted.keys().collect();
    roles.sort();

    let mut lines = vec![format!("Round {} summary:", state.round_number)];
    for role in roles {
        let accepted = &state.accepted[role];
        lines.push(format!("- {role}: {}", accepted.name));
    }
    lines.join("\n")
}

pub fn status_text(catalog: &Catalog, state: &RoundState) -> String {
    let mut lines = vec![format!("Round {}", state.round_number)];
    for role in catalog.roles_sorted_by_difficulty(true) {
        if let Some(accepted) = state.accepted.get(&role.name) {
            lines.push(format!("- {}: accepted by {}", role.name, accepted.name));
        } else if let Some(offer) = state.pending.get(&role.name) {
            lines.push(format!("- {}: pending on {}", role.name, offer.candidate));
        } else {
            lines.push(format!("- {}: unfilled", role.name));
        }
    }
    lines.join("\n")
}
