//! Catalog model (members, roles, per-member role history).
//!
//! This is the club's roster as persisted in `catalog.json`. Mutation is
//! restricted to admin ops (add/remove member) and to completion bookkeeping
//! driven by the round state machine (`record_role_completion`).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A role offered during a round. Immutable once defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub difficulty: u8,
}

/// A club member (or a registered guest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub is_guest: bool,
    pub level: u8,
    #[serde(default)]
    pub roles_done: Vec<String>,
}

/// The full roster for one club: members and roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Catalog {
    /// Look up a member by id first, then by display name.
    pub fn find_member(&self, id_or_name: &str) -> Result<&Member> {
        self.members
            .iter()
            .find(|m| m.id == id_or_name)
            .or_else(|| self.members.iter().find(|m| m.name == id_or_name))
            .ok_or_else(|| Error::NotFound(id_or_name.to_owned()))
    }

    pub fn find_member_mut(&mut self, id_or_name: &str) -> Result<&mut Member> {
        if let Some(pos) = self.members.iter().position(|m| m.id == id_or_name) {
            return Ok(&mut self.members[pos]);
        }
        let pos = self
            .members
            .iter()
            .position(|m| m.name == id_or_name)
            .ok_or_else(|| Error::NotFound(id_or_name.to_owned()))?;
        Ok(&mut self.members[pos])
    }

    pub fn find_role(&self, name: &str) -> Result<&Role> {
        self.roles
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    pub fn add_member(&mut self, member: Member) -> Result<()> {
        if self.members.iter().any(|m| m.id == member.id) {
            return Err(Error::DuplicateId(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn remove_member(&mut self, id: &str) -> Result<Member> {
        let pos = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::NotFound(id.to_owned()))?;
        Ok(self.members.remove(pos))
    }

    /// Roles ordered by difficulty; `desc` sorts hardest-first. Ties break
    /// lexicographically by name, matching the round start-up iteration order.
    pub fn roles_sorted_by_difficulty(&self, desc: bool) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.iter().collect();
        roles.sort_by(|a, b| {
            let ord = a.difficulty.cmp(&b.difficulty).then_with(|| a.name.cmp(&b.name));
            if desc {
                ord.reverse()
            } else {
                ord
            }
        });
        roles
    }

    /// Record that `member_id` has completed `role_name` in the current
    /// cycle. If this brings `roles_done` up to the club's full role count,
    /// the cycle resets to empty (invariant I5) so the member re-enters as a
    /// fresh tier-1 candidate next round.
    pub fn record_role_completion(&mut self, member_id: &str, role_name: &str) -> Result<()> {
        let role_count = self.roles.len();
        let member = self.find_member_mut(member_id)?;
        member.roles_done.push(role_name.to_owned());
        if member.roles_done.len() >= role_count {
            member.roles_done.clear();
        }
        Ok(())
    }
}
