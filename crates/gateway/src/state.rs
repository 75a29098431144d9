use std::sync::Arc;

use cb_domain::config::Config;
use cb_registry::TenantRegistry;
use cb_sessions::SessionStore;

use crate::outbound::OutboundGateway;
use crate::runtime::session_lock::SenderLockMap;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<TenantRegistry>,
    pub sessions: Arc<SessionStore>,
    pub sender_locks: Arc<SenderLockMap>,
    pub outbound: Arc<dyn OutboundGateway>,
    /// SHA-256 hash of the admin bearer token (read once at startup).
    /// `None` = dev mode (admin endpoints accessible without auth).
    pub admin_token_hash: Option<Vec<u8>>,
}
