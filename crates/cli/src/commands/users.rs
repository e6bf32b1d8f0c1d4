//! Account commands.

use phone_dialer_core::{Role, Username};
use phone_dialer_server::services::{AccountService, NewAccount, ServiceError};
use phone_dialer_server::store::JsonStore;

use super::CliError;

/// Log every account with its role and display name.
///
/// # Errors
///
/// Returns an error if the user document cannot be read.
pub async fn list(store: &JsonStore) -> Result<(), CliError> {
    let users = AccountService::new(store).list().await?;
    for (username, user) in &users {
        tracing::info!(
            username = %username,
            role = %user.role,
            name = %user.display_name,
            "Account"
        );
    }
    tracing::info!(count = users.len(), "Listed accounts");
    Ok(())
}

/// Create an account.
///
/// # Errors
///
/// Returns an error for an invalid role, a bad or taken username or an empty
/// password.
pub async fn create(
    store: &JsonStore,
    username: String,
    password: String,
    role: &str,
    name: String,
) -> Result<(), CliError> {
    let role: Role = role.parse()?;
    let username = AccountService::new(store)
        .create(NewAccount {
            username,
            password,
            role,
            name,
        })
        .await?;
    tracing::info!("Account created successfully! Username: {username}, Role: {role}");
    Ok(())
}

/// Delete an account and its list data.
///
/// # Errors
///
/// Returns an error for the admin account or an unknown username.
pub async fn delete(store: &JsonStore, username: &str) -> Result<(), CliError> {
    let username = Username::parse(username).map_err(ServiceError::from)?;
    AccountService::new(store).delete(&username).await?;
    Ok(())
}
