//! Operations on a salesperson's working list.
//!
//! A working list is the union of the numbers assigned by the last
//! distribution run and the personal numbers the salesperson added. Only the
//! personal part is mutable here; assignments are replaced wholesale by the
//! distributor.

use std::collections::HashSet;

use crate::types::SortOrder;

/// Assigned numbers followed by personal numbers, first occurrence wins.
#[must_use]
pub fn merged_list(assigned: &[String], personal: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    assigned
        .iter()
        .chain(personal)
        .filter(|phone| seen.insert(phone.as_str()))
        .cloned()
        .collect()
}

/// Append each of `phones` not already in `list`. Returns how many were added.
pub fn add_unique<I>(list: &mut Vec<String>, phones: I) -> usize
where
    I: IntoIterator<Item = String>,
{
    let mut present: HashSet<String> = list.iter().cloned().collect();
    let before = list.len();
    for phone in phones {
        if present.insert(phone.clone()) {
            list.push(phone);
        }
    }
    list.len() - before
}

/// Remove every occurrence of `phone`. Returns whether anything was removed.
pub fn remove(list: &mut Vec<String>, phone: &str) -> bool {
    let before = list.len();
    list.retain(|p| p != phone);
    list.len() != before
}

/// Drop repeated numbers, keeping the first occurrence. Returns how many were
/// dropped.
pub fn dedupe(list: &mut Vec<String>) -> usize {
    let mut seen = HashSet::new();
    let before = list.len();
    list.retain(|phone| seen.insert(phone.clone()));
    before - list.len()
}

/// Sort by numeric value.
///
/// Entries are digit strings of at most 15 digits, so they fit in a `u64`.
/// Anything that does not parse sorts after every number, in its original
/// relative order.
pub fn sort_numeric(list: &mut [String], order: SortOrder) {
    list.sort_by(|a, b| {
        let key = |s: &str| s.parse::<u64>().ok();
        match (key(a), key(b)) {
            (Some(x), Some(y)) => match order {
                SortOrder::Asc => x.cmp(&y),
                SortOrder::Desc => y.cmp(&x),
            },
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}

/// The URI a browser or handset uses to start a call.
#[must_use]
pub fn dial_uri(phone: &str) -> String {
    format!("tel:{phone}")
}
