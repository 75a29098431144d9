//! The per-sender session (§3 "Session"). In-memory only: never persisted,
//! lives for the process lifetime, cleared on an explicit "back to root."

use std::collections::HashMap;

/// Which menu surface a sender is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Root,
    Member,
    Admin,
    AdminPick,
}

/// What free-text the next inbound message should be captured as, instead
/// of being run through menu dispatch (§4.6: `add_member`/`remove_member`
/// prompt for an argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Awaiting {
    None,
    AddMember,
    RemoveMember,
}

/// A sender's menu state. One per `sender_id`, created on first inbound
/// message.
#[derive(Debug, Clone)]
pub struct Session {
    /// The club this sender's commands target, once resolved. `None` until
    /// the tenant registry has bound one (§4.3).
    pub club_id: Option<String>,
    pub mode: Mode,
    pub awaiting: Awaiting,
    /// Scratch space for a menu in progress — currently used to remember
    /// the ordered list of club ids an `admin_pick` menu is showing, so a
    /// numeral can be resolved back to a club id.
    pub buffer: HashMap<String, String>,
}

impl Default for Session {
    fn default() -> Self {
        Self { club_id: None, mode: Mode::Root, awaiting: Awaiting::None, buffer: HashMap::new() }
    }
}

impl Session {
    /// Return to the root menu, dropping any admin-pick buffer and
    /// in-flight capture, but keeping the bound club (picking a club is
    /// sticky until the sender explicitly changes tenant context).
    pub fn back_to_root(&mut self) {
        self.mode = Mode::Root;
        self.awaiting = Awaiting::None;
        self.buffer.clear();
    }

    /// Bind this session to `club_id` and enter the admin menu, recording
    /// the full candidate list so a later re-pick (ambiguous admin) can
    /// rebuild the same menu.
    pub fn enter_admin_pick(&mut self, clubs: &[String]) {
        self.mode = Mode::AdminPick;
        self.buffer.clear();
        for (i, club) in clubs.iter().enumerate() {
            self.buffer.insert((i + 1).to_string(), club.clone());
        }
    }

    pub fn pick_club(&mut self, club_id: String) {
        self.club_id = Some(club_id);
        self.mode = Mode::Admin;
        self.buffer.clear();
    }
}
