use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tenant registry location
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where to find the registry manifest and the per-club data directories.
///
/// Frozen at startup: a club added to the manifest while the process is
/// running is not picked up until restart (add-club-at-runtime is a
/// non-goal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the `{"clubs": {...}}` manifest.
    #[serde(default = "d_manifest_path")]
    pub manifest_path: PathBuf,
    /// Directory holding one subdirectory per club (`<clubs_dir>/<club_id>/`).
    #[serde(default = "d_clubs_dir")]
    pub clubs_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manifest_path: d_manifest_path(),
            clubs_dir: d_clubs_dir(),
        }
    }
}

fn d_manifest_path() -> PathBuf {
    PathBuf::from("./clubs/registry.json")
}

fn d_clubs_dir() -> PathBuf {
    PathBuf::from("./clubs")
}
