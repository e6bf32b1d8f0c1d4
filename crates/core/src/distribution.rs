//! Pool distribution across salesperson accounts.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::{Assignments, Username};

/// Reasons a distribution run cannot start.
///
/// These are user-facing notifications, not faults: the caller reports the
/// message and leaves the previous assignment untouched.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionError {
    /// No salesperson accounts exist.
    #[error("there are no salesperson accounts to distribute numbers to")]
    NoSalespeople,
    /// The pool has no numbers.
    #[error("the phone pool is empty, upload numbers first")]
    EmptyPool,
}

/// Partition a shuffled copy of `pool` as evenly as possible over `accounts`.
///
/// With `base = pool.len() / accounts.len()` and
/// `remainder = pool.len() % accounts.len()`, the first `remainder` accounts
/// (in the given order) receive `base + 1` numbers and the rest receive
/// `base`. Slices are contiguous and together cover the whole shuffled pool.
///
/// The pool itself is not modified.
///
/// # Errors
///
/// Returns [`DistributionError::NoSalespeople`] when `accounts` is empty and
/// [`DistributionError::EmptyPool`] when `pool` is empty.
pub fn distribute<R>(
    pool: &[String],
    accounts: &[Username],
    rng: &mut R,
) -> Result<Assignments, DistributionError>
where
    R: Rng + ?Sized,
{
    if accounts.is_empty() {
        return Err(DistributionError::NoSalespeople);
    }
    if pool.is_empty() {
        return Err(DistributionError::EmptyPool);
    }

    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);

    let mut assignments = Assignments::new();
    let mut remaining = shuffled.into_iter();
    for (index, account) in accounts.iter().enumerate() {
        let count = share_for(index, pool.len(), accounts.len());
        assignments.insert(account.clone(), remaining.by_ref().take(count).collect());
    }

    Ok(assignments)
}

/// How many numbers the account at `index` receives.
const fn share_for(index: usize, pool_len: usize, account_count: usize) -> usize {
    let base = pool_len / account_count;
    let remainder = pool_len % account_count;
    if index < remainder { base + 1 } else { base }
}

/// Total numbers across every account in an assignment.
#[must_use]
pub fn total_assigned(assignments: &Assignments) -> usize {
    assignments.values().map(Vec::len).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("1380000{i:04}")).collect()
    }

    fn accounts(names: &[&str]) -> Vec<Username> {
        names.iter().map(|n| Username::parse(n).unwrap()).collect()
    }

    #[test]
    fn test_ten_over_three() {
        let pool = pool(10);
        let accounts = accounts(&["sales1", "sales2", "sales3"]);
        let mut rng = StdRng::seed_from_u64(7);

        let result = distribute(&pool, &accounts, &mut rng).unwrap();

        let sizes: Vec<usize> = accounts.iter().map(|a| result[a].len()).collect();
        assert_eq!(sizes, [4, 3, 3]);

        let assigned: Vec<&String> = result.values().flatten().collect();
        let unique: HashSet<&String> = assigned.iter().copied().collect();
        assert_eq!(assigned.len(), 10);
        assert_eq!(unique.len(), 10);
        assert_eq!(unique, pool.iter().collect::<HashSet<_>>());
    }

    #[test]
    fn test_exact_division() {
        let result = distribute(
            &pool(9),
            &accounts(&["a", "b", "c"]),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert!(result.values().all(|v| v.len() == 3));
    }

    #[test]
    fn test_fewer_numbers_than_accounts() {
        let accounts = accounts(&["a", "b", "c", "d"]);
        let result = distribute(&pool(2), &accounts, &mut StdRng::seed_from_u64(3)).unwrap();
        let sizes: Vec<usize> = accounts.iter().map(|a| result[a].len()).collect();
        assert_eq!(sizes, [1, 1, 0, 0]);
        assert_eq!(total_assigned(&result), 2);
    }

    #[test]
    fn test_no_salespeople() {
        let err = distribute(&pool(5), &[], &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, DistributionError::NoSalespeople);
    }

    #[test]
    fn test_empty_pool() {
        let err = distribute(&[], &accounts(&["a"]), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, DistributionError::EmptyPool);
    }

    #[test]
    fn test_pool_left_untouched() {
        let pool = pool(6);
        let before = pool.clone();
        let _ = distribute(&pool, &accounts(&["a", "b"]), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(pool, before);
    }

    #[test]
    fn test_share_for() {
        assert_eq!(share_for(0, 10, 3), 4);
        assert_eq!(share_for(1, 10, 3), 3);
        assert_eq!(share_for(2, 10, 3), 3);
    }
}
