//! Authorization gate decisions.
//!
//! Every route group is tagged with an [`Access`] level. The middleware in
//! `middleware.rs` does the I/O (header, token, user lookup); the checks
//! themselves live here so they are evaluated in one place.

use crate::db::User;

use super::error::{AuthError, AuthResult};

/// Claims a route requires from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    /// No credential required; the gate is bypassed.
    Public,
    /// Any valid, non-archived user.
    #[default]
    Authenticated,
    /// A valid, non-archived user with the admin flag.
    Admin,
}

impl Access {
    /// Whether the route can be served without resolving a caller.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` with any casing of the scheme.
pub fn parse_bearer(header: &str) -> AuthResult<&str> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Decide whether a resolved user may pass a gate of the given level.
///
/// Archived accounts are rejected before the admin check so that an
/// archived admin gets the archival message.
pub fn admit(access: Access, user: &User) -> AuthResult<()> {
    if access.is_public() {
        return Ok(());
    }

    if user.archived {
        return Err(AuthError::AccountArchived);
    }

    if matches!(access, Access::Admin) && !user.is_admin {
        return Err(AuthError::AdminRequired);
    }

    Ok(())
}
