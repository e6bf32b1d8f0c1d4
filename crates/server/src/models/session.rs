//! Session-related types for authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use phone_dialer_core::{Role, Username};

/// Session-stored identity.
///
/// Minimal data stored in the session to identify the logged-in user. It is
/// also the `user` object returned by login and the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account key.
    pub username: Username,
    /// Role the user logged in with.
    pub role: Role,
    /// Display name.
    pub name: String,
}

impl CurrentUser {
    /// Whether this user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this user may read or change `username`'s list and call data.
    ///
    /// Admins may act on anyone; salespeople only on themselves.
    #[must_use]
    pub fn may_act_on(&self, username: &Username) -> bool {
        self.is_admin() || &self.username == username
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(name: &str, role: Role) -> CurrentUser {
        CurrentUser {
            username: Username::parse(name).unwrap(),
            role,
            name: name.to_owned(),
        }
    }

    #[test]
    fn test_salesperson_acts_only_on_self() {
        let sales1 = user("sales1", Role::Salesperson);
        assert!(sales1.may_act_on(&Username::parse("sales1").unwrap()));
        assert!(!sales1.may_act_on(&Username::parse("sales2").unwrap()));
    }

    #[test]
    fn test_admin_acts_on_anyone() {
        let admin = user("admin", Role::Admin);
        assert!(admin.may_act_on(&Username::parse("sales2").unwrap()));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(user("sales1", Role::Salesperson)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "username": "sales1", "role": "salesperson", "name": "sales1" })
        );
    }
}
