//! Principal and ownership checks shared by the service handlers.

use tonic::{Request, Status};

use crate::domain::identity::Principal;

/// The principal attached by the auth middleware.
///
/// # Errors
///
/// `Unauthenticated` when the request carries no principal.
pub fn principal_of<T>(request: &Request<T>) -> Result<Principal, Status> {
    request
        .extensions()
        .get::<Principal>()
        .cloned()
        .ok_or_else(|| Status::unauthenticated("User not authenticated"))
}

/// Check that the body `user_id` names the authenticated principal.
///
/// # Errors
///
/// `PermissionDenied` on any mismatch, including an empty `user_id`.
pub fn authorize_owner(principal: &Principal, user_id: &str) -> Result<(), Status> {
    if principal.owns(user_id) {
        Ok(())
    } else {
        tracing::warn!(
            principal = %principal,
            requested_user_id = %user_id,
            "Rejected cross-user access"
        );
        Err(Status::permission_denied("Access denied: user ID mismatch"))
    }
}

/// [`principal_of`] followed by [`authorize_owner`].
///
/// # Errors
///
/// See the two checks.
pub fn authorize<T>(request: &Request<T>, user_id: &str) -> Result<Principal, Status> {
    let principal = principal_of(request)?;
    authorize_owner(&principal, user_id)?;
    Ok(principal)
}
