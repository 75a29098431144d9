//! Hierarchical candidate selection (C4).
//!
//! `choose_candidate` is the only function in this crate and it is pure: no
//! state writes, and the same inputs always yield the same answer (P5). The
//! round state machine is the only caller, and it is responsible for
//! building `excluded_ids` per §4.4.

use std::collections::HashSet;

use cb_domain::catalog::{Member, Role};
use cb_domain::Catalog;

/// Choose the candidate for `role` out of `catalog`'s members, excluding
/// `excluded_ids`. Returns `None` only when the eligible pool is empty.
///
/// Scans tiers in order and returns the first non-empty tier's winner:
/// 1. `level >= difficulty` and the role is not in `roles_done`.
/// 2. `level >= difficulty` and the role is already in `roles_done` (repeat
///    allowed when no fresh candidate exists at adequate level).
/// 3. Fallback by descending level from `difficulty - 1` down to `1`: at
///    each level, fresh candidates before repeaters.
///
/// Within a tier, ties break by fewest `roles_done` entries, then name,
/// then id.
pub fn choose_candidate(
    catalog: &Catalog,
    role: &Role,
    excluded_ids: &HashSet<String>,
) -> Option<String> {
    let pool: Vec<&Member> = catalog
        .members
        .iter()
        .filter(|m| !excluded_ids.contains(&m.id))
        .collect();
    let d = role.difficulty;

    let fresh = |m: &&Member| !m.roles_done.iter().any(|r| r == &role.name);
    let repeat = |m: &&Member| m.roles_done.iter().any(|r| r == &role.name);

    if let Some(id) = best_of(pool.iter().copied().filter(|m| m.level >= d && fresh(m))) {
        return Some(id);
    }
    if let Some(id) = best_of(pool.iter().copied().filter(|m| m.level >= d && repeat(m))) {
        return Some(id);
    }

    for level in (1..d).rev() {
        if let Some(id) = best_of(pool.iter().copied().filter(|m| m.level == level && fresh(m))) {
            return Some(id);
        }
        if let Some(id) = best_of(pool.iter().copied().filter(|m| m.level == level && repeat(m))) {
            return Some(id);
        }
    }

    None
}

/// Deterministic tie-break winner of a tier: fewest `roles_done`, then
/// lexicographic name, then id.
fn best_of<'a>(candidates: impl Iterator<Item = &'a Member>) -> Option<String> {
    candidates
        .min_by(|a, b| {
            a.roles_done
                .len()
                .cmp(&b.roles_done.len())
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|m| m.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_domain::catalog::{Member, Role};

    fn member(id: &str, name: &str, level: u8, roles_done: &[&str]) -> Member {
        Member {
            name: name.into(),
            id: id.into(),
            is_guest: false,
            level,
            roles_done: roles_done.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn role(name: &str, difficulty: u8) -> Role {
        Role { name: name.into(), difficulty }
    }

    #[test]
    fn scenario_a_tie_break_favors_fewest_done_then_name() {
        // Two level-2 members, neither has done R2, fewest-done ties so name
        // order decides: A before B.
        let catalog = Catalog {
            members: vec![member("1", "A", 2, &[]), member("2", "B", 2, &[])],
            roles: vec![role("R1", 1), role("R2", 2)],
        };
        let r2 = role("R2", 2);
        let winner = choose_candidate(&catalog, &r2, &HashSet::new());
        assert_eq!(winner, Some("1".into()));
    }

    #[test]
    fn scenario_c_fallback_below_required_level() {
        // Role difficulty 3, but all members are level 1 -> falls through
        // tiers 1/2 (empty) down to level 1, picks by name order.
        let catalog = Catalog {
            members: vec![member("2", "Zara", 1, &[]), member("1", "Ana", 1, &[])],
            roles: vec![role("R3", 3)],
        };
        let r3 = role("R3", 3);
        let winner = choose_candidate(&catalog, &r3, &HashSet::new());
        assert_eq!(winner, Some("1".into()));
    }

    #[test]
    fn repeaters_only_chosen_when_no_fresh_candidate_at_level() {
        let catalog = Catalog {
            members: vec![member("1", "A", 2, &["R2"])],
            roles: vec![role("R2", 2)],
        };
        let r2 = role("R2", 2);
        assert_eq!(choose_candidate(&catalog, &r2, &HashSet::new()), Some("1".into()));
    }

    #[test]
    fn excluded_ids_remove_candidates_from_the_pool() {
        let catalog = Catalog {
            members: vec![member("1", "A", 2, &[])],
            roles: vec![role("R1", 1)],
        };
        let r1 = role("R1", 1);
        let excluded: HashSet<String> = ["1".to_string()].into_iter().collect();
        assert_eq!(choose_candidate(&catalog, &r1, &excluded), None);
    }

    #[test]
    fn empty_pool_returns_none() {
        let catalog = Catalog { members: vec![], roles: vec![role("R1", 1)] };
        assert_eq!(choose_candidate(&catalog, &role("R1", 1), &HashSet::new()), None);
    }

    #[test]
    fn purity_same_inputs_same_output() {
        let catalog = Catalog {
            members: vec![member("1", "A", 2, &[]), member("2", "B", 2, &[])],
            roles: vec![role("R2", 2)],
        };
        let r2 = role("R2", 2);
        let first = choose_candidate(&catalog, &r2, &HashSet::new());
        let second = choose_candidate(&catalog, &r2, &HashSet::new());
        assert_eq!(first, second);
    }

    #[test]
    fn guests_are_included_by_current_policy() {
        let mut catalog = Catalog {
            members: vec![member("1", "A", 2, &[])],
            roles: vec![role("R1", 1)],
        };
        catalog.members[0].is_guest = true;
        assert_eq!(choose_candidate(&catalog, &role("R1", 1), &HashSet::new()), Some("1".into()));
    }
}
