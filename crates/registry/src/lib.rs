//! Tenant Registry (C3): loads every club named in the registry manifest,
//! owns its `TenantContext`, and disambiguates an inbound sender to a club.

mod lock;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use cb_domain::error::{Error, Result};
use cb_domain::trace::TraceEvent;
use cb_persistence::ClubStore;

pub use lock::TenantLockMap;

/// One club's loaded state, as seen by the rest of the engine.
pub struct TenantContext {
    pub club_id: String,
    pub store: ClubStore,
    pub admins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    clubs: HashMap<String, ManifestClub>,
}

#[derive(Debug, Deserialize)]
struct ManifestClub {
    #[serde(default)]
    admins: Vec<String>,
}

/// Where an inbound sender's commands should be routed, per §4.3's
/// resolution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantResolution {
    Club(String),
    NeedsPick(Vec<String>),
    UnknownSender,
}

/// All loaded tenants, frozen after startup (`add-club-at-runtime` is a
/// non-goal), plus the lock map each command execution acquires through.
pub struct TenantRegistry {
    contexts: HashMap<String, TenantContext>,
    pub locks: TenantLockMap,
}

impl TenantRegistry {
    /// Read the registry manifest and open every named club's store. Any
    /// single club failing to load (missing/corrupt catalog) fails the whole
    /// load — a partially-initialized registry is worse than refusing to
    /// start.
    pub fn load(manifest_path: &Path, clubs_dir: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(manifest_path).map_err(Error::Io)?;
        let manifest: Manifest = serde_json::from_str(&raw).map_err(Error::Json)?;

        let mut contexts = HashMap::new();
        for (club_id, entry) in manifest.clubs {
            let store = ClubStore::open(clubs_dir, &club_id)?;
            let catalog = store.catalog.snapshot();
            TraceEvent::TenantLoaded {
                club_id: club_id.clone(),
                members: catalog.members.len(),
                roles: catalog.roles.len(),
            }
            .emit();
            contexts.insert(club_id.clone(), TenantContext { club_id, store, admins: entry.admins });
        }

        Ok(Self { contexts, locks: TenantLockMap::new() })
    }

    pub fn context(&self, club_id: &str) -> Option<&TenantContext> {
        self.contexts.get(club_id)
    }

    pub fn contexts(&self) -> impl Iterator<Item = &TenantContext> {
        self.contexts.values()
    }

    /// Clubs where `sender_id` appears in the admin list.
    pub fn admin_clubs(&self, sender_id: &str) -> Vec<String> {
        self.contexts
            .values()
            .filter(|c| c.admins.iter().any(|a| a == sender_id))
            .map(|c| c.club_id.clone())
            .collect()
    }

    /// Clubs where `sender_id` is a catalog member.
    pub fn member_clubs(&self, sender_id: &str) -> Vec<String> {
        self.contexts
            .values()
            .filter(|c| c.store.catalog.snapshot().find_member(sender_id).is_ok())
            .map(|c| c.club_id.clone())
            .collect()
    }

    /// The club and role of `sender_id`'s pending offer, if any, searched
    /// across every tenant (§4.6 step 1 checks "any club", not just the
    /// resolved one).
    pub fn pending_offer_for(&self, sender_id: &str) -> Option<(String, String)> {
        self.contexts.values().find_map(|c| {
            let state = c.store.state.snapshot();
            state.pending_role_for(sender_id).map(|role| (c.club_id.clone(), role.to_owned()))
        })
    }

    /// Clubs where `sender_id` currently holds a pending offer or an
    /// accepted role.
    pub fn busy_clubs(&self, sender_id: &str) -> Vec<String> {
        self.contexts
            .values()
            .filter(|c| c.store.state.snapshot().busy_member_ids().contains(sender_id))
            .map(|c| c.club_id.clone())
            .collect()
    }

    /// Resolve which club `sender_id`'s command targets, per §4.3 (a)-(e).
    pub fn infer_tenant(&self, sender_id: &str, session_club_id: Option<&str>) -> TenantResolution {
        if let Some(club_id) = session_club_id {
            if self.contexts.contains_key(club_id) {
                TraceEvent::TenantResolved { sender_id: sender_id.to_owned(), club_id: club_id.to_owned(), rule: "session" }
                    .emit();
                return TenantResolution::Club(club_id.to_owned());
            }
        }

        let member_clubs = self.member_clubs(sender_id);
        if member_clubs.len() == 1 {
            let club_id = member_clubs.into_iter().next().unwrap();
            TraceEvent::TenantResolved { sender_id: sender_id.to_owned(), club_id: club_id.clone(), rule: "member" }.emit();
            return TenantResolution::Club(club_id);
        }

        let admin_clubs = self.admin_clubs(sender_id);
        if admin_clubs.len() == 1 {
            let club_id = admin_clubs.into_iter().next().unwrap();
            TraceEvent::TenantResolved { sender_id: sender_id.to_owned(), club_id: club_id.clone(), rule: "admin" }.emit();
            return TenantResolution::Club(club_id);
        }

        if let Some(club_id) = self.busy_clubs(sender_id).into_iter().next() {
            TraceEvent::TenantResolved { sender_id: sender_id.to_owned(), club_id: club_id.clone(), rule: "busy" }.emit();
            return TenantResolution::Club(club_id);
        }

        if !admin_clubs.is_empty() {
            return TenantResolution::NeedsPick(admin_clubs);
        }
        TenantResolution::UnknownSender
    }
}
