//! Core types for the phone dialer.
//!
//! This module provides type-safe wrappers and the persisted document shapes.

pub mod account;
pub mod role;
pub mod username;

pub use account::{
    Assignments, CallDataTable, User, UserCallData, UserTable, salespeople, seed_users,
};
pub use role::{Role, RoleParseError, SortOrder};
pub use username::{Username, UsernameError};
