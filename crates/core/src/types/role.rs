//! Account roles and list ordering.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}. Valid roles: admin, salesperson")]
pub struct RoleParseError(pub String);

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages accounts, the shared pool and distribution.
    Admin,
    /// Works a personal call list.
    Salesperson,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Salesperson => write!(f, "salesperson"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "salesperson" => Ok(Self::Salesperson),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

/// Direction for numeric sorting of a call list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_str() {
        for role in [Role::Admin, Role::Salesperson] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("viewer".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_json() {
        assert_eq!(
            serde_json::to_string(&Role::Salesperson).unwrap(),
            "\"salesperson\""
        );
    }

    #[test]
    fn test_sort_order_default_and_json() {
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        let parsed: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(parsed, SortOrder::Desc);
    }
}
