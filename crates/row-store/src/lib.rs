//! A dual-typed row store: `(iden, prop, value, tstamp)` facts over SQLite,
//! with an attached keyed blob namespace for schema sentinels and opaque
//! configuration values.
//!
//! [`RowStore`] is the entry point. Lower-level modules ([`rows`], [`blob`],
//! [`schema`], [`transaction`]) operate directly on a borrowed [`rusqlite::Connection`]
//! and are exposed for callers that need to compose several operations inside
//! one transaction.

pub mod blob;
pub mod catalogue;
pub mod error;
pub mod pool;
pub mod rows;
pub mod schema;
pub mod store;
pub mod transaction;
pub mod value;

pub use catalogue::{Catalogue, Family};
pub use error::{Result, RowStoreError};
pub use pool::{ConnectionPool, PooledConnection};
pub use rows::PropQuery;
pub use store::{RowStore, RowStoreConfig};
pub use transaction::run_in_transaction;
pub use value::{Row, TypeAxis, Value};
