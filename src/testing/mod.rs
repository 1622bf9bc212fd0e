//! Testing infrastructure for trackmark.
//!
//! - **Fixtures**: item trees shared by unit tests, integration tests and
//!   benches
//! - **Store fixture**: a [`StateStore`](crate::StateStore) rooted in a
//!   temporary directory (test-only)
//!
//! # Example
//!
//! ```rust
//! use trackmark::testing::fixtures;
//!
//! let tree = fixtures::propagation_tree();
//! assert_eq!(tree[0].id, "grandparent");
//! ```

pub mod fixtures;
#[cfg(test)]
pub mod store_fixture;

#[cfg(test)]
pub use store_fixture::StoreFixture;
