//! Data models for the server.

pub mod session;

pub use session::CurrentUser;
pub use session::keys as session_keys;
