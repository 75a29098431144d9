//! Admin ops (C7): add/remove member with invariant checks, member listing.
//!
//! These functions take an already-loaded `Catalog` and the round state it
//! must be checked against; the caller (`cb-registry`) holds the tenant lock
//! and persists afterward, same discipline as `cb-round`.

use cb_domain::catalog::Member;
use cb_domain::error::{Error, Result};
use cb_domain::trace::TraceEvent;
use cb_domain::{Catalog, RoundState};

/// A member row for listing, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub name: String,
    pub id: String,
    pub level: u8,
}

/// Add a member with `level = 1`, `roles_done = []`, `is_guest = false`.
/// Fails with `InvalidId` if `id` is not E.164 digit form, `DuplicateId` if
/// it already exists.
pub fn add_member(club_id: &str, catalog: &mut Catalog, name: &str, id: &str) -> Result<()> {
    if !is_e164_digits(id) {
        return Err(Error::InvalidId(id.to_owned()));
    }
    catalog.add_member(Member {
        name: name.to_owned(),
        id: id.to_owned(),
        is_guest: false,
        level: 1,
        roles_done: vec![],
    })?;
    TraceEvent::MemberAdded { club_id: club_id.to_owned(), member_id: id.to_owned() }.emit();
    Ok(())
}

/// Remove a member by id or name. Refuses with `MemberBusy` if the member
/// currently holds a pending offer or an accepted role this round (§4.7).
pub fn remove_member(club_id: &str, catalog: &mut Catalog, state: &mut RoundState, reference: &str) -> Result<Member> {
    let id = catalog.find_member(reference)?.id.clone();
    if state.busy_member_ids().contains(&id) {
        return Err(Error::MemberBusy);
    }
    let removed = catalog.remove_member(&id)?;
    state.members_cycle.remove(&id);
    TraceEvent::MemberRemoved { club_id: club_id.to_owned(), member_id: id }.emit();
    Ok(removed)
}

/// List members sorted by name.
pub fn members_list(catalog: &Catalog) -> Vec<MemberRow> {
    let mut rows: Vec<MemberRow> = catalog
        .members
        .iter()
        .map(|m| MemberRow { name: m.name.clone(), id: m.id.clone(), level: m.level })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

fn is_e164_digits(id: &str) -> bool {
    !id.is_empty() && id.len() <= 15 && id.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_domain::catalog::Role;
    use cb_domain::round::{AcceptedRole, PendingOffer};

    fn sample_catalog() -> Catalog {
        Catalog {
            members: vec![
                Member { name: "Ana".into(), id: "15551230001".into(), is_guest: false, level: 2, roles_done: vec![] },
                Member { name: "Beto".into(), id: "15551230002".into(), is_guest: false, level: 2, roles_done: vec![] },
            ],
            roles: vec![Role { name: "R1".into(), difficulty: 1 }],
        }
    }

    #[test]
    fn add_member_rejects_non_digit_id() {
        let mut c = sample_catalog();
        assert!(matches!(add_member("club", &mut c, "X", "abc"), Err(Error::InvalidId(_))));
    }

    #[test]
    fn add_member_rejects_leading_plus() {
        let mut c = sample_catalog();
        assert!(matches!(add_member("club", &mut c, "X", "+15551230099"), Err(Error::InvalidId(_))));
    }

    #[test]
    fn add_member_succeeds_and_defaults_level_to_one() {
        let mut c = sample_catalog();
        add_member("club", &mut c, "Cora", "15551230003").unwrap();
        let m = c.find_member("15551230003").unwrap();
        assert_eq!(m.level, 1);
        assert!(m.roles_done.is_empty());
        assert!(!m.is_guest);
    }

    #[test]
    fn add_member_rejects_duplicate() {
        let mut c = sample_catalog();
        assert!(matches!(add_member("club", &mut c, "Dup", "15551230001"), Err(Error::DuplicateId(_))));
    }

    #[test]
    fn scenario_e_remove_blocked_while_accepted_then_succeeds_after_reset() {
        let mut catalog = sample_catalog();
        let mut state = RoundState::default();
        state.accepted.insert("R1".into(), AcceptedRole { waid: "15551230002".into(), name: "Beto".into() });

        assert!(matches!(remove_member("club", &mut catalog, &mut state, "15551230002"), Err(Error::MemberBusy)));

        state.accepted.clear();
        let removed = remove_member("club", &mut catalog, &mut state, "15551230002").unwrap();
        assert_eq!(removed.id, "15551230002");
        assert!(catalog.find_member("15551230002").is_err());
    }

    #[test]
    fn remove_member_blocked_while_pending() {
        let mut catalog = sample_catalog();
        let mut state = RoundState::default();
        state.pending.insert(
            "R1".into(),
            PendingOffer { candidate: "15551230001".into(), declined_by: vec![], accepted: false },
        );
        assert!(matches!(remove_member("club", &mut catalog, &mut state, "Ana"), Err(Error::MemberBusy)));
    }

    #[test]
    fn members_list_is_sorted_by_name() {
        let catalog = sample_catalog();
        let rows = members_list(&catalog);
        assert_eq!(rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["Ana", "Beto"]);
    }
}
