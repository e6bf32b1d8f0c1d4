//! Dialer service.
//!
//! Personal working lists and call counters, keyed by username in the
//! call-data document. The assigned part of a working list comes from the
//! assignment document and is read-only here.

use chrono::Utc;
use serde::Serialize;

use phone_dialer_core::phone::{extract_mobile_numbers, parse_list_entry};
use phone_dialer_core::{SortOrder, UserCallData, Username, call_list};

use super::ServiceError;
use crate::store::JsonStore;

/// A personal list after an add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUpdate {
    /// The personal list as stored.
    pub phone_numbers: Vec<String>,
    /// How many entries were new.
    pub added: usize,
}

/// Counters after a call was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub total_calls: u64,
    pub last_call_time: Option<chrono::DateTime<Utc>>,
    /// URI that starts the call on the client.
    pub dial_uri: String,
}

/// Dialer service.
pub struct DialerService<'a> {
    store: &'a JsonStore,
}

impl<'a> DialerService<'a> {
    /// Create a new dialer service.
    #[must_use]
    pub const fn new(store: &'a JsonStore) -> Self {
        Self { store }
    }

    /// Assigned numbers followed by personal numbers, without repeats.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if a document cannot be read.
    pub async fn working_list(&self, user: &Username) -> Result<Vec<String>, ServiceError> {
        let assignments = self.store.assignments().await?;
        let table = self.store.call_data().await?;

        let assigned = assignments.get(user).map_or(&[][..], Vec::as_slice);
        let personal = table.get(user).map_or(&[][..], |data| data.phones.as_slice());
        Ok(call_list::merged_list(assigned, personal))
    }

    /// The stored call data for `user`, empty if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be read.
    pub async fn call_data(&self, user: &Username) -> Result<UserCallData, ServiceError> {
        Ok(self
            .store
            .call_data()
            .await?
            .remove(user)
            .unwrap_or_default())
    }

    /// Replace `user`'s call data.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be written.
    pub async fn put_call_data(
        &self,
        user: &Username,
        data: UserCallData,
    ) -> Result<(), ServiceError> {
        self.store
            .update_call_data(|table| {
                table.insert(user.clone(), data);
                Ok::<_, ServiceError>(())
            })
            .await
    }

    /// Run `f` on `user`'s personal list and persist the result.
    async fn with_list<F, R>(&self, user: &Username, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<String>) -> Result<R, ServiceError>,
    {
        self.store
            .update_call_data(|table| f(&mut table.entry(user.clone()).or_default().phones))
            .await
    }

    /// Add one typed number.
    ///
    /// A number already in the list is accepted and not added again.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the entry is blank or not 7-15
    /// digits once cleaned.
    pub async fn add_phone(&self, user: &Username, raw: &str) -> Result<ListUpdate, ServiceError> {
        let phone = parse_list_entry(raw)?;
        self.add_all(user, vec![phone]).await
    }

    /// Add several typed numbers. Invalid entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if no entry is valid.
    pub async fn add_bulk(
        &self,
        user: &Username,
        entries: &[String],
    ) -> Result<ListUpdate, ServiceError> {
        let phones: Vec<String> = entries
            .iter()
            .filter_map(|entry| parse_list_entry(entry).ok())
            .collect();
        if phones.is_empty() {
            return Err(ServiceError::Validation(
                "no valid phone numbers (7-15 digits) were entered".to_string(),
            ));
        }
        self.add_all(user, phones).await
    }

    /// Add the mobile numbers found in recognized text.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the text holds no mobile number.
    pub async fn add_extracted(
        &self,
        user: &Username,
        text: &str,
    ) -> Result<ListUpdate, ServiceError> {
        let phones = extract_mobile_numbers(text);
        if phones.is_empty() {
            return Err(ServiceError::Validation(
                "no mobile numbers were recognized".to_string(),
            ));
        }
        self.add_all(user, phones).await
    }

    async fn add_all(&self, user: &Username, phones: Vec<String>) -> Result<ListUpdate, ServiceError> {
        let update = self
            .with_list(user, |list| {
                let added = call_list::add_unique(list, phones);
                Ok(ListUpdate {
                    phone_numbers: list.clone(),
                    added,
                })
            })
            .await?;
        tracing::info!(username = %user, added = update.added, "Added to personal list");
        Ok(update)
    }

    /// Remove a number from the personal list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the number is not in the list.
    pub async fn remove_phone(
        &self,
        user: &Username,
        phone: &str,
    ) -> Result<Vec<String>, ServiceError> {
        self.with_list(user, |list| {
            if call_list::remove(list, phone) {
                Ok(list.clone())
            } else {
                Err(ServiceError::NotFound(format!(
                    "'{phone}' is not in the list"
                )))
            }
        })
        .await
    }

    /// Empty the personal list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be written.
    pub async fn clear(&self, user: &Username) -> Result<(), ServiceError> {
        self.with_list(user, |list| {
            list.clear();
            Ok(())
        })
        .await?;
        tracing::info!(username = %user, "Cleared personal list");
        Ok(())
    }

    /// Sort the personal list numerically.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be written.
    pub async fn sort(&self, user: &Username, order: SortOrder) -> Result<Vec<String>, ServiceError> {
        self.with_list(user, |list| {
            call_list::sort_numeric(list, order);
            Ok(list.clone())
        })
        .await
    }

    /// Drop repeated numbers from the personal list.
    ///
    /// Returns the list and how many entries were dropped.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the document cannot be written.
    pub async fn dedupe(&self, user: &Username) -> Result<(Vec<String>, usize), ServiceError> {
        self.with_list(user, |list| {
            let removed = call_list::dedupe(list);
            Ok((list.clone(), removed))
        })
        .await
    }

    /// Count a call to `phone`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `phone` is not a valid entry.
    pub async fn record_call(&self, user: &Username, phone: &str) -> Result<CallRecord, ServiceError> {
        let phone = parse_list_entry(phone)?;
        let now = Utc::now();

        let data = self
            .store
            .update_call_data(|table| {
                let data = table.entry(user.clone()).or_default();
                data.record_call(now);
                Ok::<_, ServiceError>(data.clone())
            })
            .await?;

        tracing::info!(username = %user, total_calls = data.total_calls, "Recorded call");
        Ok(CallRecord {
            total_calls: data.total_calls,
            last_call_time: data.last_call_time,
            dial_uri: call_list::dial_uri(&phone),
        })
    }
}
