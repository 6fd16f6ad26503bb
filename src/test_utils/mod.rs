use std::sync::LazyLock;
use tokio::runtime::Runtime;

/// Shared tokio runtime for test utilities to avoid creating multiple runtimes
pub(crate) static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// Helpers for building rows and results by hand.
pub mod test_helpers;

/// `PostgreSQL` embedded database functionality
pub mod postgres;

pub use postgres::*;
