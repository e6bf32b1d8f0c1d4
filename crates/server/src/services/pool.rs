//! Pool service.
//!
//! Imports into the shared pool and distribution over salespeople.

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use phone_dialer_core::distribution::total_assigned;
use phone_dialer_core::{Assignments, Username, distribute, extract_phone_numbers, salespeople};

use super::ServiceError;
use crate::store::JsonStore;

/// Result of adding text to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    /// Numbers that were new to the pool, in discovery order.
    pub added: Vec<String>,
    /// Pool size after the import.
    pub total: usize,
}

/// Result of a distribution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionOutcome {
    pub total_assigned: usize,
    pub salespeople: Vec<Username>,
    pub assignments: Assignments,
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub total_phones: usize,
    pub distributed_phones: usize,
    pub active_salespeople: usize,
}

/// Pool service.
pub struct PoolService<'a> {
    store: &'a JsonStore,
}

impl<'a> PoolService<'a> {
    /// Create a new pool service.
    #[must_use]
    pub const fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    /// The whole pool.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be read.
    pub async fn pool(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.pool().await?)
    }

    /// Replace the pool. Repeated entries are dropped, keeping the first.
    ///
    /// Returns the stored pool.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be written.
    pub async fn replace(&self, phones: Vec<String>) -> Result<Vec<String>, ServiceError> {
        let mut seen = HashSet::new();
        let pool: Vec<String> = phones
            .into_iter()
            .filter(|phone| seen.insert(phone.clone()))
            .collect();
        self.store.put_pool(&pool).await?;
        Ok(pool)
    }

    /// Extract numbers from `text` and append the new ones to the pool.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` when the text holds no number that
    /// is both valid and new.
    pub async fn import_text(&self, text: &str) -> Result<ImportOutcome, ServiceError> {
        let outcome = self
            .store
            .update_pool(|pool| {
                let added = extract_phone_numbers(text, pool);
                if added.is_empty() {
                    return Err(ServiceError::Validation(
                        "no valid phone numbers found".to_string(),
                    ));
                }
                pool.extend(added.iter().cloned());
                Ok(ImportOutcome {
                    added,
                    total: pool.len(),
                })
            })
            .await?;

        tracing::info!(
            added = outcome.added.len(),
            total = outcome.total,
            "Imported numbers into pool"
        );
        Ok(outcome)
    }

    /// Empty the pool.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be written.
    pub async fn clear(&self) -> Result<(), ServiceError> {
        self.store.put_pool(&[]).await?;
        tracing::info!("Cleared pool");
        Ok(())
    }

    /// The current assignment.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be read.
    pub async fn assignments(&self) -> Result<Assignments, ServiceError> {
        Ok(self.store.assignments().await?)
    }

    /// Replace the assignment.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be written.
    pub async fn replace_assignments(&self, assignments: &Assignments) -> Result<(), ServiceError> {
        self.store.put_assignments(assignments).await?;
        Ok(())
    }

    /// Partition the pool over every salesperson and replace the assignment.
    ///
    /// The pool itself is left as it is.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Distribution` when there are no salespeople or
    /// the pool is empty; the stored assignment is untouched in that case.
    pub async fn distribute<R>(&self, rng: &mut R) -> Result<DistributionOutcome, ServiceError>
    where
        R: Rng + ?Sized,
    {
        let users = self.store.users().await?;
        let accounts = salespeople(&users);
        let pool = self.store.pool().await?;

        let assignments = distribute(&pool, &accounts, rng).inspect_err(|e| {
            tracing::warn!(error = %e, "Distribution refused");
        })?;
        self.store.put_assignments(&assignments).await?;

        let outcome = DistributionOutcome {
            total_assigned: total_assigned(&assignments),
            salespeople: accounts,
            assignments,
        };
        tracing::info!(
            total_assigned = outcome.total_assigned,
            salespeople = outcome.salespeople.len(),
            "Distributed pool"
        );
        Ok(outcome)
    }

    /// Pool size, assigned numbers and salesperson count.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if a document cannot be read.
    pub async fn stats(&self) -> Result<PoolStats, ServiceError> {
        let pool = self.store.pool().await?;
        let assignments = self.store.assignments().await?;
        let users = self.store.users().await?;

        Ok(PoolStats {
            total_phones: pool.len(),
            distributed_phones: total_assigned(&assignments),
            active_salespeople: salespeople(&users).len(),
        })
    }
}
