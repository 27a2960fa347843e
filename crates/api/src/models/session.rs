//! Per-request identity.

use stockroom_core::UserId;

/// Identity carried by a verified access token.
///
/// Built by the `RequireAuth` extractor; nothing here is read from the
/// database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Username at the time the token was issued.
    pub username: String,
    /// ID of the refresh token this access token belongs to.
    pub session_id: String,
}
