//! Service layer.
//!
//! Services borrow the [`JsonStore`](crate::store::JsonStore) and implement
//! each operation as one or more whole-document read-modify-write cycles.
//! Route handlers stay thin: extract, authorize, call a service, serialize.

pub mod accounts;
pub mod dialer;
pub mod error;
pub mod ocr;
pub mod pool;

pub use accounts::{AccountService, NewAccount};
pub use dialer::DialerService;
pub use error::ServiceError;
pub use ocr::{RecognitionError, RecognitionTracker, TextRecognizer};
pub use pool::PoolService;
