//! Request context carrying the authenticated user.

use asgard_core::types::Username;

/// Context for the current authenticated request.
///
/// Produced by [`BackupGateway::authenticate`](crate::BackupGateway::authenticate)
/// and passed into every gateway operation, so an operation cannot run
/// without a resolved token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The username the presented token was issued for.
    pub user: Username,
}

impl RequestContext {
    pub(crate) fn new(user: Username) -> Self {
        Self { user }
    }
}
