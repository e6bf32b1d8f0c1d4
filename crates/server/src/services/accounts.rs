//! Account service.
//!
//! Login checks and account management over the user document.

use serde::Deserialize;

use phone_dialer_core::{Role, User, UserTable, Username};

use super::ServiceError;
use crate::models::CurrentUser;
use crate::store::JsonStore;

/// Input for creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default, alias = "displayName")]
    pub name: String,
}

/// Account service.
pub struct AccountService<'a> {
    store: &'a JsonStore,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    /// Check a login attempt.
    ///
    /// Username, password and role must all match the stored account. The
    /// password is compared verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidCredentials` on any mismatch, including
    /// an unknown or malformed username.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<CurrentUser, ServiceError> {
        let username = Username::parse(username).map_err(|_| ServiceError::InvalidCredentials)?;
        let users = self.store.users().await?;

        match users.get(&username) {
            Some(user) if user.password == password && user.role == role => Ok(CurrentUser {
                username,
                role,
                name: user.display_name.clone(),
            }),
            _ => Err(ServiceError::InvalidCredentials),
        }
    }

    /// The whole user table.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be read.
    pub async fn list(&self) -> Result<UserTable, ServiceError> {
        Ok(self.store.users().await?)
    }

    /// Whether `username` has an account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be read.
    pub async fn exists(&self, username: &Username) -> Result<bool, ServiceError> {
        Ok(self.store.users().await?.contains_key(username))
    }

    /// Replace the whole user table.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the table drops the built-in
    /// admin or demotes it.
    pub async fn replace(&self, users: UserTable) -> Result<(), ServiceError> {
        match users.get(Username::ADMIN) {
            Some(admin) if admin.role == Role::Admin => {}
            _ => {
                return Err(ServiceError::Validation(
                    "the admin account cannot be removed".to_string(),
                ));
            }
        }
        self.store.put_users(&users).await?;
        tracing::info!(count = users.len(), "Replaced user table");
        Ok(())
    }

    /// Create an account.
    ///
    /// An empty display name defaults to the username.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad username or an empty
    /// password, and `ServiceError::Conflict` if the username is taken.
    pub async fn create(&self, account: NewAccount) -> Result<Username, ServiceError> {
        let username = Username::parse(&account.username)?;
        if account.password.is_empty() {
            return Err(ServiceError::Validation("password cannot be empty".to_string()));
        }
        let name = match account.name.trim() {
            "" => username.to_string(),
            name => name.to_owned(),
        };

        self.store
            .update_users(|users| {
                if users.contains_key(&username) {
                    return Err(ServiceError::Conflict(format!(
                        "username '{username}' already exists"
                    )));
                }
                users.insert(
                    username.clone(),
                    User {
                        password: account.password,
                        role: account.role,
                        display_name: name,
                    },
                );
                Ok(())
            })
            .await?;

        tracing::info!(username = %username, role = %account.role, "Created account");
        Ok(username)
    }

    /// Delete an account along with its assignment and call data.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for the built-in admin, whoever asks,
    /// and `ServiceError::NotFound` for an unknown username.
    pub async fn delete(&self, username: &Username) -> Result<(), ServiceError> {
        if username.is_builtin_admin() {
            return Err(ServiceError::Forbidden(
                "the admin account cannot be deleted".to_string(),
            ));
        }

        self.store
            .update_users(|users| {
                users
                    .remove(username)
                    .map(|_| ())
                    .ok_or_else(|| ServiceError::NotFound(format!("user '{username}' not found")))
            })
            .await?;
        self.store
            .update_assignments(|assignments| {
                assignments.remove(username);
                Ok::<_, ServiceError>(())
            })
            .await?;
        self.store
            .update_call_data(|table| {
                table.remove(username);
                Ok::<_, ServiceError>(())
            })
            .await?;

        tracing::info!(username = %username, "Deleted account");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use phone_dialer_core::seed_users;

    use super::*;

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        (dir, store)
    }

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_requires_matching_role() {
        let (_dir, store) = store();
        let service = AccountService::new(&store);

        let user = service
            .authenticate("admin", "admin123", Role::Admin)
            .await
            .unwrap();
        assert_eq!(user.username, name("admin"));
        assert_eq!(user.name, "System Administrator");

        let err = service
            .authenticate("admin", "admin123", Role::Salesperson)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        let err = service
            .authenticate("sales1", "wrong", Role::Salesperson)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        let err = service
            .authenticate("", "", Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let (_dir, store) = store();
        let service = AccountService::new(&store);

        let created = service
            .create(NewAccount {
                username: "  sales4 ".to_string(),
                password: "pw".to_string(),
                role: Role::Salesperson,
                name: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(created, name("sales4"));

        let users = service.list().await.unwrap();
        assert_eq!(users[&created].display_name, "sales4");

        let err = service
            .create(NewAccount {
                username: "sales4".to_string(),
                password: "pw".to_string(),
                role: Role::Salesperson,
                name: "Again".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields() {
        let (_dir, store) = store();
        let service = AccountService::new(&store);

        let err = service
            .create(NewAccount {
                username: "   ".to_string(),
                password: "pw".to_string(),
                role: Role::Salesperson,
                name: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .create(NewAccount {
                username: "sales9".to_string(),
                password: String::new(),
                role: Role::Salesperson,
                name: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_admin_always_rejected() {
        let (_dir, store) = store();
        let service = AccountService::new(&store);

        let err = service.delete(&name("admin")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(service.exists(&name("admin")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_assignment() {
        let (_dir, store) = store();
        let service = AccountService::new(&store);
        let mut assignments = phone_dialer_core::Assignments::new();
        assignments.insert(name("sales1"), vec!["13812345678".to_owned()]);
        assignments.insert(name("sales2"), vec!["13912345678".to_owned()]);
        store.put_assignments(&assignments).await.unwrap();

        service.delete(&name("sales1")).await.unwrap();

        assert!(!service.exists(&name("sales1")).await.unwrap());
        let assignments = store.assignments().await.unwrap();
        assert!(!assignments.contains_key("sales1"));
        assert!(assignments.contains_key("sales2"));

        let err = service.delete(&name("sales1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_replace_keeps_admin() {
        let (_dir, store) = store();
        let service = AccountService::new(&store);

        let mut users = seed_users();
        users.remove("admin");
        let err = service.replace(users).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut users = seed_users();
        users.remove("sales3");
        service.replace(users).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 3);
    }
}
