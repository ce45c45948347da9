use crate::{Error, auth::UserID};

/// Check that a resource owned by `owner` may be accessed by `user_id`.
///
/// # Errors
///
/// Returns [Error::Forbidden] if the resource belongs to another user.
pub fn ensure_owner(owner: UserID, user_id: UserID) -> Result<(), Error> {
    if owner == user_id {
        Ok(())
    } else {
        tracing::warn!("User {user_id} tried to access a resource owned by user {owner}");
        Err(Error::Forbidden)
    }
}
