pub mod builtin;
pub mod schema;
pub mod store;

pub use builtin::{builtin_algorithms, seed_builtin};
pub use store::SqliteStore;
