use std::path::Path;

use cb_domain::error::Result;
use cb_domain::{Catalog, RoundState};

use crate::atomic::AtomicJsonStore;

/// The two persisted documents for one club: its catalog and its round
/// ledger, each independently mutex-guarded and atomically written.
pub struct ClubStore {
    pub club_id: String,
    pub catalog: AtomicJsonStore<Catalog>,
    pub state: AtomicJsonStore<RoundState>,
}

impl ClubStore {
    /// Open `<clubs_dir>/<club_id>/{catalog,state}.json`. The catalog must
    /// already exist (seeded externally); the round file is created lazily.
    pub fn open(clubs_dir: &Path, club_id: &str) -> Result<Self> {
        let dir = clubs_dir.join(club_id);
        let catalog = AtomicJsonStore::load_required(dir.join("catalog.json"), club_id)?;
        let state = AtomicJsonStore::load_or_default(dir.join("state.json"), club_id)?;
        Ok(Self { club_id: club_id.to_owned(), catalog, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_domain::catalog::{Member, Role};
    use std::fs;

    fn seed(dir: &Path, club_id: &str) {
        let club_dir = dir.join(club_id);
        fs::create_dir_all(&club_dir).unwrap();
        let catalog = Catalog {
            members: vec![Member {
                name: "Ana".into(),
                id: "1".into(),
                is_guest: false,
                level: 2,
                roles_done: vec![],
            }],
            roles: vec![Role { name: "R1".into(), difficulty: 1 }],
        };
        fs::write(
            club_dir.join("catalog.json"),
            serde_json::to_string_pretty(&catalog).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn open_loads_catalog_and_defaults_state() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), "alpha");
        let store = ClubStore::open(dir.path(), "alpha").unwrap();
        assert_eq!(store.catalog.snapshot().members.len(), 1);
        assert_eq!(store.state.snapshot().round_number, 0);
    }

    #[test]
    fn open_missing_catalog_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClubStore::open(dir.path(), "missing").is_err());
    }
}
