//! In-memory sessions for the admin dashboard.

use dashmap::DashMap;
use tracing::info;

use asgard_core::types::Username;

use crate::random_hex;

/// Random bytes per session id (32 hex chars).
const SESSION_ID_BYTES: usize = 16;

/// Maps admin session ids to the administrator that logged in.
#[derive(Debug, Default)]
pub struct AdminSessions {
    sessions: DashMap<String, Username>,
}

impl AdminSessions {
    /// Create an empty session table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `admin` and return its id.
    pub fn create(&self, admin: &Username) -> String {
        let id = random_hex(SESSION_ID_BYTES);
        self.sessions.insert(id.clone(), admin.clone());
        info!(admin = %admin, "Admin session started");
        id
    }

    /// The administrator owning `session_id`, if any.
    pub fn resolve(&self, session_id: &str) -> Option<Username> {
        self.sessions.get(session_id).map(|e| e.value().clone())
    }

    /// End a session. Unknown ids are ignored.
    pub fn end(&self, session_id: &str) {
        if let Some((_, admin)) = self.sessions.remove(session_id) {
            info!(admin = %admin, "Admin session ended");
        }
    }
}
