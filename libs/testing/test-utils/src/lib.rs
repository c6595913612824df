//! Shared test infrastructure for the pricing workspace
//!
//! - `TestDatabase`: PostgreSQL container with the workspace migrations applied
//! - `TestDataBuilder`: deterministic account ids and addresses per test
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn locks_once() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("locks_once");
//!     let account_id = builder.account_id();
//!     let address = builder.address(1);
//! }
//! ```

use uuid::Uuid;

mod postgres;

pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name so every test gets its own stable data
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id_n(0)
    }

    /// The `n`-th distinct account for this seed
    pub fn account_id_n(&self, n: u64) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..].copy_from_slice(&n.to_le_bytes());
        Uuid::from_bytes(bytes)
    }

    /// An address from the 203.0.113.0/24 documentation range
    pub fn address(&self, n: u8) -> String {
        let host = (self.seed as u8).wrapping_add(n);
        format!("203.0.113.{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let a = TestDataBuilder::from_test_name("my_test");
        let b = TestDataBuilder::from_test_name("my_test");

        assert_eq!(a.account_id(), b.account_id());
        assert_eq!(a.address(3), b.address(3));
    }

    #[test]
    fn test_data_builder_different_names() {
        let a = TestDataBuilder::from_test_name("test1");
        let b = TestDataBuilder::from_test_name("test2");
        assert_ne!(a.account_id(), b.account_id());
    }

    #[test]
    fn test_account_ids_are_distinct_per_index() {
        let builder = TestDataBuilder::new(7);
        assert_ne!(builder.account_id_n(0), builder.account_id_n(1));
    }

    #[test]
    fn test_address_in_documentation_range() {
        let builder = TestDataBuilder::new(42);
        assert!(builder.address(0).starts_with("203.0.113."));
    }
}
