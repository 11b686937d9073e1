//! Mock auth helpers for integration tests.
//!
//! Services behind the gateway receive `x-commun-user-id` + `x-commun-user-role` headers
//! injected by the gateway. In tests, `MockAuth` builds these headers directly
//! so no real gateway or session cookie is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use commun_auth_types::identity::{X_COMMUN_USER_ID, X_COMMUN_USER_ROLE};
use commun_domain::user::UserRole;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub user_role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    pub fn customer(user_id: Uuid) -> Self {
        Self::new(user_id, UserRole::Customer)
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_COMMUN_USER_ID),
            HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
        );
        map.insert(
            HeaderName::from_static(X_COMMUN_USER_ROLE),
            HeaderValue::from(u16::from(self.user_role.as_u8())),
        );
        map
    }
}
