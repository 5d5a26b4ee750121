//! Row-level write policies shared by every store
//!
//! - a Patota may only be inserted by the user it names as creator
//! - a membership may only be inserted by the user it is for
//! - an Administrator membership may only be inserted for the creator

use super::patota::{Membership, Patota, Role};
use super::store::StoreError;
use crate::types::UserId;

pub fn check_patota_insert(actor: &UserId, patota: &Patota) -> Result<(), StoreError> {
    if actor != &patota.created_by {
        return Err(StoreError::PermissionDenied(format!(
            "{} cannot create a patota on behalf of {}",
            actor, patota.created_by
        )));
    }
    Ok(())
}

pub fn check_membership_insert(
    actor: &UserId,
    membership: &Membership,
    patota: &Patota,
) -> Result<(), StoreError> {
    if actor != &membership.user_id {
        return Err(StoreError::PermissionDenied(format!(
            "{} cannot add {} to a patota",
            actor, membership.user_id
        )));
    }
    if membership.role == Role::Administrator && membership.user_id != patota.created_by {
        return Err(StoreError::PermissionDenied(
            "only the creator can hold the Administrator role".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_patota::invite::InviteCode;

    fn patota() -> Patota {
        Patota::new("Team A".into(), None, InviteCode::generate(6), UserId::new("alice"))
    }

    #[test]
    fn test_patota_insert_requires_creator() {
        let p = patota();
        assert!(check_patota_insert(&UserId::new("alice"), &p).is_ok());
        assert!(matches!(
            check_patota_insert(&UserId::new("mallory"), &p),
            Err(StoreError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_membership_only_for_self() {
        let p = patota();
        let bob = Membership::member(p.id, UserId::new("bob"));

        assert!(check_membership_insert(&UserId::new("bob"), &bob, &p).is_ok());
        assert!(check_membership_insert(&UserId::new("alice"), &bob, &p).is_err());
    }

    #[test]
    fn test_self_promotion_denied() {
        let p = patota();
        let mut bob = Membership::member(p.id, UserId::new("bob"));
        bob.role = Role::Administrator;

        assert!(check_membership_insert(&UserId::new("bob"), &bob, &p).is_err());
        assert!(check_membership_insert(&UserId::new("alice"), &p.creator_membership(), &p).is_ok());
    }
}
