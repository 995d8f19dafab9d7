//! 認証後に適用する認可ルール
//!
//! - 所有者: caller の `user_id` が resource の owner と一致すること
//! - role override: action ごとに列挙した role は所有者チェックを免除
//! - resource を先に load する。存在しなければ `NotFound` (`Forbidden` にはしない)

use std::future::Future;

use uuid::Uuid;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::repos::error::RepoError;

pub const ROLE_ADMIN: &str = "admin";

/// A stored entity with exactly one owning subject.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadBooking,
    UpdateBookingStatus,
    ListAllBookings,
    ManageStations,
}

impl Action {
    /// Roles allowed to act regardless of ownership.
    pub fn override_roles(self) -> &'static [&'static str] {
        match self {
            Action::ReadBooking
            | Action::UpdateBookingStatus
            | Action::ListAllBookings
            | Action::ManageStations => &[ROLE_ADMIN],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ReadBooking => "read_booking",
            Action::UpdateBookingStatus => "update_booking_status",
            Action::ListAllBookings => "list_all_bookings",
            Action::ManageStations => "manage_stations",
        }
    }
}

pub fn has_override(ctx: &AuthCtx, action: Action) -> bool {
    ctx.role
        .as_deref()
        .is_some_and(|role| action.override_roles().contains(&role))
}

/// Owner passes regardless of role; otherwise an overriding role is required.
pub fn authorize<R: Owned + ?Sized>(
    ctx: &AuthCtx,
    resource: &R,
    action: Action,
) -> Result<(), AppError> {
    let owner_id = resource.owner_id();
    if ctx.user_id == owner_id || has_override(ctx, action) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %ctx.user_id,
        owner_id = %owner_id,
        action = action.as_str(),
        "ownership check denied"
    );
    Err(AppError::forbidden())
}

/// Role-only gate for actions without an owned resource.
pub fn require_role(ctx: &AuthCtx, action: Action) -> Result<(), AppError> {
    if has_override(ctx, action) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %ctx.user_id,
        role = ctx.role.as_deref().unwrap_or("-"),
        action = action.as_str(),
        "role check denied"
    );
    Err(AppError::Forbidden {
        message: "Forbidden: Admins only",
    })
}

/// Load a resource, then authorize against the loaded instance.
///
/// Store failures pass through as 500s; they are not part of the
/// NotFound/Forbidden taxonomy.
pub async fn load_then_authorize<R, F>(
    ctx: &AuthCtx,
    action: Action,
    resource: &'static str,
    load: F,
) -> Result<R, AppError>
where
    R: Owned,
    F: Future<Output = Result<Option<R>, RepoError>>,
{
    let found = load.await?.ok_or(AppError::not_found(resource))?;
    authorize(ctx, &found, action)?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    struct Doc(Uuid);

    impl Owned for Doc {
        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    fn ctx(user_id: Uuid, role: Option<&str>) -> AuthCtx {
        AuthCtx {
            user_id,
            role: role.map(str::to_string),
            email: None,
        }
    }

    fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<u128>().prop_map(Uuid::from_u128)
    }

    fn arb_role() -> impl Strategy<Value = Option<String>> {
        prop::option::of(prop_oneof![
            Just("user".to_string()),
            Just("admin".to_string()),
            "[a-z_]{1,12}",
        ])
    }

    fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::ReadBooking),
            Just(Action::UpdateBookingStatus),
            Just(Action::ListAllBookings),
            Just(Action::ManageStations),
        ]
    }

    proptest! {
        /// Property: the owner is always allowed, whatever the role
        #[test]
        fn owner_is_allowed_regardless_of_role(
            owner in arb_uuid(),
            role in arb_role(),
            action in arb_action(),
        ) {
            let caller = AuthCtx { user_id: owner, role, email: None };
            prop_assert!(authorize(&caller, &Doc(owner), action).is_ok());
        }

        /// Property: a non-owner without an overriding role is forbidden
        #[test]
        fn non_owner_without_override_is_forbidden(
            owner in arb_uuid(),
            caller_id in arb_uuid(),
            role in "[a-z_]{1,12}",
            action in arb_action(),
        ) {
            prop_assume!(owner != caller_id);
            prop_assume!(role != ROLE_ADMIN);

            let caller = ctx(caller_id, Some(&role));
            let res = authorize(&caller, &Doc(owner), action);
            prop_assert!(
                matches!(res, Err(AppError::Forbidden { message: "Forbidden" })),
                "expected Forbidden, got {:?}",
                res
            );
        }
    }

    #[test]
    fn admin_overrides_ownership() {
        let caller = ctx(Uuid::new_v4(), Some(ROLE_ADMIN));
        assert!(authorize(&caller, &Doc(Uuid::new_v4()), Action::UpdateBookingStatus).is_ok());
    }

    #[test]
    fn missing_role_never_overrides() {
        let caller = ctx(Uuid::new_v4(), None);
        assert!(authorize(&caller, &Doc(Uuid::new_v4()), Action::ReadBooking).is_err());
    }

    #[test]
    fn station_management_needs_admin() {
        let user = ctx(Uuid::new_v4(), Some("user"));
        let err = require_role(&user, Action::ManageStations).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: Admins only");

        let admin = ctx(Uuid::new_v4(), Some("admin"));
        assert!(require_role(&admin, Action::ManageStations).is_ok());
    }

    #[tokio::test]
    async fn missing_resource_is_not_found_before_ownership() {
        let caller = ctx(Uuid::new_v4(), None);
        let res = load_then_authorize::<Doc, _>(&caller, Action::ReadBooking, "Booking", async {
            Ok(None)
        })
        .await;

        assert!(matches!(res, Err(AppError::NotFound { resource: "Booking" })));
    }

    #[tokio::test]
    async fn loaded_resource_of_someone_else_is_forbidden() {
        let caller = ctx(Uuid::new_v4(), Some("user"));
        let other = Uuid::new_v4();
        let res = load_then_authorize(&caller, Action::UpdateBookingStatus, "Booking", async move {
            Ok(Some(Doc(other)))
        })
        .await;

        assert!(matches!(res, Err(AppError::Forbidden { .. })));
    }
}
