pub mod pool;

pub use pool::{Database, DatabaseConfig, DatabaseError, Dialect};
