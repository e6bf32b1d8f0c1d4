//! Account username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input is empty after trimming.
    #[error("username cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot appear in a URL path segment.
    #[error("username cannot contain '{0}'")]
    InvalidCharacter(char),
}

/// A unique account key.
///
/// Usernames key the user table, the assignment map and the per-user call
/// data, and they appear as a path segment in `/api/users/{username}/...`.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length: 1-64 characters
/// - No inner whitespace, `/`, `?` or `#`
///
/// ## Examples
///
/// ```
/// use phone_dialer_core::Username;
///
/// assert_eq!(Username::parse("  sales1 ").unwrap().as_str(), "sales1");
/// assert!(Username::parse("").is_err());
/// assert!(Username::parse("a/b").is_err());
/// ```
///
/// Deserialization goes through [`Username::parse`], so the same limits hold
/// for JSON map keys and values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 64;

    /// The built-in administrator account. It can never be deleted.
    pub const ADMIN: &'static str = "admin";

    /// Parse a `Username` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`] characters, or contains whitespace or a URL
    /// delimiter.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
        {
            return Err(UsernameError::InvalidCharacter(c));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Wrap a value already known to satisfy the constraints.
    pub(crate) const fn from_trusted(s: String) -> Self {
        Self(s)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether this is the built-in administrator account.
    #[must_use]
    pub fn is_builtin_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Username {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let name = Username::parse("  sales1\t").unwrap();
        assert_eq!(name.as_str(), "sales1");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(65);
        assert!(matches!(
            Username::parse(&long),
            Err(UsernameError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert_eq!(
            Username::parse("a/b"),
            Err(UsernameError::InvalidCharacter('/'))
        );
        assert_eq!(
            Username::parse("a b"),
            Err(UsernameError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_builtin_admin() {
        assert!(Username::parse("admin").unwrap().is_builtin_admin());
        assert!(!Username::parse("admin2").unwrap().is_builtin_admin());
    }

    #[test]
    fn test_serde_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Username::parse("sales1").unwrap(), 3);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"sales1":3}"#);

        let parsed: std::collections::BTreeMap<Username, i32> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_deserialize_applies_constraints() {
        let name: Username = serde_json::from_str("\" sales1 \"").unwrap();
        assert_eq!(name.as_str(), "sales1");
        assert!(serde_json::from_str::<Username>("\"a/b\"").is_err());

        let empty_key = serde_json::from_str::<std::collections::BTreeMap<Username, i32>>(
            r#"{"": 1}"#,
        );
        assert!(empty_key.is_err());
    }
}
