//! StoreQL core - the pure pieces of the natural-language query pipeline.
//!
//! - **schema**: the fixed darkstore schema descriptor and its prompt rendering
//! - **registry**: table name to primary-key lookup for the CRUD scaffold
//! - **prompt**: composition of the generation prompt
//! - **sanitize**: cosmetic cleanup of raw model output
//! - **safety**: the static gate that decides whether a generated query may run
//!
//! Nothing in this crate does I/O. The executor downstream accepts only
//! [`safety::SafeQuery`] values, and the sole way to mint one is
//! [`safety::validate`], so a query that skipped validation cannot be executed
//! by construction.

pub mod prompt;
pub mod registry;
pub mod safety;
pub mod sanitize;
pub mod schema;

pub use registry::{TableEntry, TableRegistry};
pub use safety::{validate, SafeQuery, Verdict};
pub use sanitize::sanitize;
pub use schema::SchemaDescriptor;
