//! Accounts, assignments and per-user call data.
//!
//! These are the shapes of the persisted JSON documents. Maps are ordered by
//! username so that every enumeration (including the distributor's) is
//! deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, Username};

/// A stored account.
///
/// The username is the key of the enclosing [`UserTable`], not a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Plaintext password, compared verbatim at login.
    pub password: String,
    /// Account role.
    pub role: Role,
    /// Human-readable display name.
    #[serde(rename = "name", alias = "displayName")]
    pub display_name: String,
}

/// The user document: username → account.
pub type UserTable = BTreeMap<Username, User>;

/// The assignment document: salesperson → allotted numbers.
pub type Assignments = BTreeMap<Username, Vec<String>>;

/// The call-data document: username → personal list and counters.
pub type CallDataTable = BTreeMap<Username, UserCallData>;

/// A salesperson's personal working list and call counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserCallData {
    /// Personal list, in display order.
    #[serde(default)]
    pub phones: Vec<String>,
    /// Number of calls placed.
    #[serde(default)]
    pub total_calls: u64,
    /// When the last call was placed.
    #[serde(default)]
    pub last_call_time: Option<DateTime<Utc>>,
}

impl UserCallData {
    /// Count a call placed at `at`.
    pub fn record_call(&mut self, at: DateTime<Utc>) {
        self.total_calls += 1;
        self.last_call_time = Some(at);
    }
}

/// Usernames of all salesperson accounts, in table order.
///
/// The admin role is filtered out here; this is the account set the pool
/// distributor partitions over.
#[must_use]
pub fn salespeople(users: &UserTable) -> Vec<Username> {
    users
        .iter()
        .filter(|(_, user)| user.role == Role::Salesperson)
        .map(|(name, _)| name.clone())
        .collect()
}

/// The accounts present on first run.
#[must_use]
pub fn seed_users() -> UserTable {
    let mut users = UserTable::new();
    users.insert(
        Username::from_trusted(Username::ADMIN.to_owned()),
        User {
            password: "admin123".to_owned(),
            role: Role::Admin,
            display_name: "System Administrator".to_owned(),
        },
    );
    for n in 1..=3 {
        users.insert(
            Username::from_trusted(format!("sales{n}")),
            User {
                password: "sales123".to_owned(),
                role: Role::Salesperson,
                display_name: format!("Salesperson {n}"),
            },
        );
    }
    users
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_users() {
        let users = seed_users();
        assert_eq!(users.len(), 4);
        assert_eq!(users.get("admin").unwrap().role, Role::Admin);
        assert_eq!(users.get("sales2").unwrap().password, "sales123");
    }

    #[test]
    fn test_salespeople_excludes_admin() {
        let names: Vec<String> = salespeople(&seed_users())
            .into_iter()
            .map(Username::into_inner)
            .collect();
        assert_eq!(names, ["sales1", "sales2", "sales3"]);
    }

    #[test]
    fn test_user_wire_format() {
        let json = r#"{"password":"x","role":"salesperson","name":"Alice"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.display_name, "Alice");
        assert_eq!(serde_json::to_string(&user).unwrap(), json);

        let aliased: User =
            serde_json::from_str(r#"{"password":"x","role":"admin","displayName":"Root"}"#)
                .unwrap();
        assert_eq!(aliased.display_name, "Root");
    }

    #[test]
    fn test_call_data_defaults_and_record() {
        let mut data: UserCallData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, UserCallData::default());

        let now = Utc::now();
        data.record_call(now);
        data.record_call(now);
        assert_eq!(data.total_calls, 2);
        assert_eq!(data.last_call_time, Some(now));

        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("totalCalls").is_some());
        assert!(json.get("lastCallTime").is_some());
    }
}
