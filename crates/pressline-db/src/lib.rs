//! # pressline-db: Database Layer for Pressline POS
//!
//! All SQLite access for the system lives here: one pooled connection
//! set, one embedded migration chain, and typed repositories per
//! aggregate. Nothing outside this crate writes SQL.
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./pressline.db")).await?;
//! let customer = db.customers().get_by_id(42).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
