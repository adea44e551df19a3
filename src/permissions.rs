// Ownership predicate shared by every mutating item endpoint.

use crate::database::models::Owned;
use crate::error::ApiError;
use crate::middleware::Requester;

const DENIED: &str = "You do not have permission to perform this action.";

/// True iff the requester is authenticated and owns the row
pub fn is_owner(owner_id: i64, requester: &Requester) -> bool {
    requester.user_id() == Some(owner_id)
}

/// Write access (update, delete) is reserved to the owner
pub fn check_owner<E: Owned>(requester: &Requester, entity: &E) -> Result<(), ApiError> {
    let user = requester.require()?;
    if user.user_id != entity.owner_id() {
        tracing::warn!(
            "User {} denied write access to row owned by {}",
            user.user_id,
            entity.owner_id()
        );
        return Err(ApiError::forbidden(DENIED));
    }
    Ok(())
}

/// Administrative resources are closed to everyone but staff, reads included
pub fn check_admin(requester: &Requester) -> Result<(), ApiError> {
    let user = requester.require()?;
    if !user.is_staff {
        tracing::warn!("User {} denied access to an administrative resource", user.user_id);
        return Err(ApiError::forbidden(DENIED));
    }
    Ok(())
}
