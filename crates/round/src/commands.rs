use std::collections::HashSet;

use cb_domain::error::{Error, Result};
use cb_domain::round::{AcceptedRole, PendingOffer};
use cb_domain::trace::TraceEvent;
use cb_domain::{Catalog, RoundState};
use cb_selection::choose_candidate;

use crate::render;

/// One message to deliver to one recipient, produced as a side effect of a
/// command. The caller sends these after the mutated state is persisted and
/// the tenant lock is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub text: String,
}

/// Start a new round. Refuses with `RoundInProgress` if the prior round left
/// offers outstanding and wasn't canceled (I4). Roles already resolved by a
/// preserved `accepted` entry (from a round that was canceled mid-flight)
/// are left alone; only unresolved roles are offered.
pub fn start_round(
    club_id: &str,
    catalog: &Catalog,
    state: &mut RoundState,
    admins: &[String],
) -> Result<Vec<OutboundMessage>> {
    if !state.pending.is_empty() && !state.canceled {
        return Err(Error::RoundInProgress);
    }
    state.canceled = false;
    state.pending.clear();
    state.round_number += 1;

    let mut messages = Vec::new();
    let mut offered = 0usize;
    let mut unfilled = 0usize;

    for role in catalog.roles_sorted_by_difficulty(true) {
        if state.accepted.contains_key(&role.name) {
            continue;
        }

        let excluded = state.busy_member_ids();
        match choose_candidate(catalog, role, &excluded) {
            Some(candidate_id) => {
                let member_name = catalog
                    .find_member(&candidate_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default();
                state.pending.insert(
                    role.name.clone(),
                    PendingOffer { candidate: candidate_id.clone(), declined_by: vec![], accepted: false },
                );
                messages.push(OutboundMessage {
                    to: candidate_id.clone(),
                    text: render::offer_text(&role.name, &member_name),
                });
                TraceEvent::RoleOffered {
                    club_id: club_id.to_owned(),
                    round_number: state.round_number,
                    role: role.name.clone(),
                    candidate_id,
                }
                .emit();
                offered += 1;
            }
            None => {
                unfilled += 1;
                for admin in admins {
                    messages.push(OutboundMessage { to: admin.clone(), text: render::no_candidate_text(&role.name) });
                }
            }
        }
    }

    TraceEvent::RoundStarted {
        club_id: club_id.to_owned(),
        round_number: state.round_number,
        roles_offered: offered,
        roles_unfilled: unfilled,
    }
    .emit();

    Ok(messages)
}

/// Record `sender_id` accepting their pending offer. Once no roles remain
/// pending, broadcasts the round summary to admins and every accepted member.
pub fn accept(
    club_id: &str,
    catalog: &mut Catalog,
    state: &mut RoundState,
    admins: &[String],
    sender_id: &str,
) -> Result<Vec<OutboundMessage>> {
    let role_name = state.pending_role_for(sender_id).map(str::to_owned).ok_or(Error::NoPendingOffer)?;
    state.pending.remove(&role_name);

    let member_name = catalog.find_member(sender_id)?.name.clone();
    state.accepted.insert(role_name.clone(), AcceptedRole { waid: sender_id.to_owned(), name: member_name });
    state.members_cycle.entry(sender_id.to_owned()).or_default().push(role_name.clone());

    let before = catalog.find_member(sender_id)?.roles_done.len();
    catalog.record_role_completion(sender_id, &role_name)?;
    let after = catalog.find_member(sender_id)?.roles_done.len();
    if after < before {
        TraceEvent::CycleReset { club_id: club_id.to_owned(), member_id: sender_id.to_owned() }.emit();
    }

    TraceEvent::RoleAccepted {
        club_id: club_id.to_owned(),
        round_number: state.round_number,
        role: role_name,
        member_id: sender_id.to_owned(),
    }
    .emit();

    let mut messages = Vec::new();
    if state.pending.is_empty() {
        let summary = render::summary_text(state);
        state.last_summary = Some(summary.clone());
        for admin in admins {
            messages.push(OutboundMessage { to: admin.clone(), text: summary.clone() });
        }
        for accepted in state.accepted.values() {
            messages.push(OutboundMessage { to: accepted.waid.clone(), text: summary.clone() });
        }
    }
    Ok(messages)
}

/// Record `sender_id` declining their pending offer, then re-select excluding
/// everyone who has declined this role plus everyone currently busy (I1, I3).
/// If no replacement exists, the role is exhausted and admins are notified.
pub fn reject(
    club_id: &str,
    catalog: &Catalog,
    state: &mut RoundState,
    admins: &[String],
    sender_id: &str,
) -> Result<Vec<OutboundMessage>> {
    let role_name = state.pending_role_for(sender_id).map(str::to_owned).ok_or(Error::NoPendingOffer)?;
    let mut offer = state.pending.remove(&role_name).expect("role_name came from pending_role_for");
    offer.declined_by.push(sender_id.to_owned());

    let mut excluded: HashSet<String> = offer.declined_by.iter().cloned().collect();
    excluded.extend(state.busy_member_ids());

    let role = catalog.find_role(&role_name)?;
    let mut messages = Vec::new();

    match choose_candidate(catalog, role, &excluded) {
        Some(candidate_id) => {
            let member_name = catalog.find_member(&candidate_id).map(|m| m.name.clone()).unwrap_or_default();
            offer.candidate = candidate_id.clone();
            state.pending.insert(role_name.clone(), offer);
            messages.push(OutboundMessage { to: candidate_id, text: render::offer_text(&role_name, &member_name) });
            TraceEvent::RoleRejected {
                club_id: club_id.to_owned(),
                round_number: state.round_number,
                role: role_name,
                member_id: sender_id.to_owned(),
                reselected: true,
            }
            .emit();
        }
        None => {
            TraceEvent::RoleRejected {
                club_id: club_id.to_owned(),
                round_number: state.round_number,
                role: role_name.clone(),
                member_id: sender_id.to_owned(),
                reselected: false,
            }
            .emit();
            TraceEvent::RoleExhausted { club_id: club_id.to_owned(), round_number: state.round_number, role: role_name.clone() }
                .emit();
            for admin in admins {
                messages.push(OutboundMessage { to: admin.clone(), text: render::exhausted_text(&role_name) });
            }
        }
    }

    Ok(messages)
}

/// Acknowledge without changing anything: the offer stays pending on the
/// same candidate until they ACCEPT or REJECT.
pub fn defer(state: &RoundState, sender_id: &str) -> Result<Vec<OutboundMessage>> {
    let role_name = state.pending_role_for(sender_id).ok_or(Error::NoPendingOffer)?;
    Ok(vec![OutboundMessage { to: sender_id.to_owned(), text: render::defer_ack_text(role_name) }])
}

/// Stop offering outstanding roles, preserving whatever was already accepted.
pub fn cancel_round(club_id: &str, state: &mut RoundState) {
    state.canceled = true;
    state.pending.clear();
    TraceEvent::RoundCanceled { club_id: club_id.to_owned(), round_number: state.round_number }.emit();
}

/// Clear the round ledger entirely, ready for a fresh cycle. `round_number`
/// is left untouched; only START_ROUND advances it.
pub fn reset(club_id: &str, state: &mut RoundState) {
    state.pending.clear();
    state.accepted.clear();
    state.members_cycle.clear();
    state.canceled = false;
    TraceEvent::RoundReset { club_id: club_id.to_owned(), round_number: state.round_number }.emit();
}

/// Render a human-readable snapshot of the current round. Read-only.
pub fn status(catalog: &Catalog, state: &RoundState) -> String {
    render::status_text(catalog, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_domain::catalog::{Member, Role};

    fn member(id: &str, name: &str, level: u8) -> Member {
        Member { name: name.into(), id: id.into(), is_guest: false, level, roles_done: vec![] }
    }

    fn one_role_catalog() -> Catalog {
        Catalog {
            members: vec![member("1", "Ana", 2), member("2", "Beto", 2)],
            roles: vec![Role { name: "R1".into(), difficulty: 1 }],
        }
    }

    fn admins() -> Vec<String> {
        vec!["admin1".into()]
    }

    #[test]
    fn start_then_accept_emits_summary_to_admin_and_member() {
        let catalog = one_role_catalog();
        let mut state = RoundState::default();

        let offers = start_round("club", &catalog, &mut state, &admins()).unwrap();
        assert_eq!(offers.len(), 1);
        let candidate = state.pending.get("R1").unwrap().candidate.clone();
        assert_eq!(candidate, "1"); // fewest roles_done tie -> name order, Ana first

        let mut catalog = catalog;
        let msgs = accept("club", &mut catalog, &mut state, &admins(), &candidate).unwrap();
        assert!(state.pending.is_empty());
        assert_eq!(state.accepted.len(), 1);
        // Summary goes to the one admin and the one accepted member.
        assert_eq!(msgs.len(), 2);
    }

    #[test]
    fn scenario_a_two_roles_tie_break_then_both_accept() {
        let mut catalog = Catalog {
            members: vec![member("1", "A", 2), member("2", "B", 2)],
            roles: vec![Role { name: "R1".into(), difficulty: 1 }, Role { name: "R2".into(), difficulty: 2 }],
        };
        let mut state = RoundState::default();

        start_round("club", &catalog, &mut state, &[]).unwrap();
        // R2 is processed first (higher difficulty); A wins the fewest-done/name tie-break.
        assert_eq!(state.pending.get("R2").unwrap().candidate, "1");
        assert_eq!(state.pending.get("R1").unwrap().candidate, "2");

        accept("club", &mut catalog, &mut state, &[], "1").unwrap();
        accept("club", &mut catalog, &mut state, &[], "2").unwrap();

        assert!(state.pending.is_empty());
        assert_eq!(state.accepted.get("R2").unwrap().waid, "1");
        assert_eq!(state.accepted.get("R1").unwrap().waid, "2");
        assert!(catalog.find_member("1").unwrap().roles_done.contains(&"R2".to_string()));
        assert!(catalog.find_member("2").unwrap().roles_done.contains(&"R1".to_string()));
    }

    #[test]
    fn scenario_b_reject_excludes_member_already_pending_elsewhere() {
        let catalog = Catalog {
            members: vec![member("1", "A", 2), member("2", "B", 2)],
            roles: vec![Role { name: "R1".into(), difficulty: 1 }, Role { name: "R2".into(), difficulty: 2 }],
        };
        let mut state = RoundState::default();
        start_round("club", &catalog, &mut state, &admins()).unwrap();
        // A holds R2, B holds R1.

        let msgs = reject("club", &catalog, &mut state, &admins(), "1").unwrap();
        // B is the only other member but is already busy with R1, so R2 is exhausted.
        assert!(state.pending.get("R2").is_none());
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].text.contains("no remaining candidates"));
        // R1 is untouched.
        assert_eq!(state.pending.get("R1").unwrap().candidate, "2");
    }

    #[test]
    fn reject_reselects_then_exhausts_when_pool_empty() {
        let catalog = one_role_catalog();
        let mut state = RoundState::default();
        start_round("club", &catalog, &mut state, &admins()).unwrap();

        let first = state.pending.get("R1").unwrap().candidate.clone();
        let msgs = reject("club", &catalog, &mut state, &admins(), &first).unwrap();
        assert_eq!(msgs.len(), 1);
        let second = state.pending.get("R1").unwrap().candidate.clone();
        assert_ne!(first, second);

        // Second candidate also rejects -> pool of two members exhausted.
        let msgs = reject("club", &catalog, &mut state, &admins(), &second).unwrap();
        assert!(state.pending.get("R1").is_none());
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].text.contains("no remaining candidates"));
    }

    #[test]
    fn reject_without_a_pending_offer_errors() {
        let catalog = one_role_catalog();
        let mut state = RoundState::default();
        assert!(matches!(reject("club", &catalog, &mut state, &admins(), "1"), Err(Error::NoPendingOffer)));
    }

    #[test]
    fn start_round_refuses_while_pending_and_not_canceled() {
        let catalog = one_role_catalog();
        let mut state = RoundState::default();
        start_round("club", &catalog, &mut state, &admins()).unwrap();
        assert!(matches!(start_round("club", &catalog, &mut state, &admins()), Err(Error::RoundInProgress)));
    }

    #[test]
    fn start_round_after_cancel_starts_clean() {
        let catalog = one_role_catalog();
        let mut state = RoundState::default();
        start_round("club", &catalog, &mut state, &admins()).unwrap();
        cancel_round("club", &mut state);
        assert!(state.pending.is_empty());
        let offers = start_round("club", &catalog, &mut state, &admins()).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(state.round_number, 2);
    }

    #[test]
    fn scenario_d_cycle_resets_across_rounds_after_reset() {
        let mut catalog = Catalog {
            members: vec![member("1", "Ana", 3)],
            roles: vec![
                Role { name: "R1".into(), difficulty: 1 },
                Role { name: "R2".into(), difficulty: 2 },
                Role { name: "R3".into(), difficulty: 3 },
            ],
        };
        let mut state = RoundState::default();

        for _ in 0..3 {
            start_round("club", &catalog, &mut state, &[]).unwrap();
            // Only one member exists, so each role in this round lands on her.
            while !state.pending.is_empty() {
                let role_names: Vec<String> = state.pending.keys().cloned().collect();
                for role in role_names {
                    let candidate = state.pending.get(&role).unwrap().candidate.clone();
                    accept("club", &mut catalog, &mut state, &[], &candidate).unwrap();
                }
            }
            reset("club", &mut state);
        }

        assert!(catalog.find_member("1").unwrap().roles_done.is_empty());
    }

    #[test]
    fn defer_leaves_the_offer_untouched() {
        let catalog = one_role_catalog();
        let mut state = RoundState::default();
        start_round("club", &catalog, &mut state, &admins()).unwrap();
        let candidate = state.pending.get("R1").unwrap().candidate.clone();

        let msgs = defer(&state, &candidate).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(state.pending.get("R1").unwrap().candidate, candidate);
    }

    #[test]
    fn status_lists_every_role() {
        let catalog = one_role_catalog();
        let state = RoundState::default();
        assert_eq!(status(&catalog, &state), "Round 0\n- R1: unfilled");
    }
}
