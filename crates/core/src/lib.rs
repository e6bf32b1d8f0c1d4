//! Phone Dialer Core - Shared types and pure algorithms.
//!
//! This crate provides the pieces used by every phone dialer component:
//! - `server` - Session-authenticated JSON REST API
//! - `cli` - Command-line tools for seeding and administration
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no file
//! access, no HTTP. Every rule that decides which numbers are accepted, how a
//! pool is split, or how a working list changes lives here and is unit-tested
//! without a server.
//!
//! # Modules
//!
//! - [`types`] - Usernames, roles, accounts and the persisted document shapes
//! - [`phone`] - Cleaning, validation and extraction of phone numbers
//! - [`distribution`] - Even, shuffled partition of the pool over salespeople
//! - [`call_list`] - Personal working list operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod call_list;
pub mod distribution;
pub mod phone;
pub mod types;

pub use distribution::{DistributionError, distribute};
pub use phone::{PhoneEntryError, extract_phone_numbers, is_valid_phone_number};
pub use types::*;
