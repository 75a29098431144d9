//! In-memory session store. Unlike the teacher's `sessions.json`-backed
//! store, this one is deliberately never persisted (§3: "Session ...
//! TTL: lives for the process lifetime").

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::session::Session;

/// All sessions tracked by this process, keyed by `sender_id`.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the sender's session, creating a default one on
    /// first contact. Returns `f`'s result.
    pub fn with_mut<R>(&self, sender_id: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.sessions.lock();
        let session = sessions.entry(sender_id.to_owned()).or_default();
        f(session)
    }

    /// A clone of the sender's current session (creating a default one on
    /// first contact).
    pub fn snapshot(&self, sender_id: &str) -> Session {
        self.with_mut(sender_id, |s| s.clone())
    }

    /// Drop a sender's session entirely (process-lifetime TTL means this
    /// is only ever used by tests / explicit admin maintenance, not by the
    /// engine itself).
    pub fn remove(&self, sender_id: &str) {
        self.sessions.lock().remove(sender_id);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}
