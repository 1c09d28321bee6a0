//! Infrastructure layer: persistence backends for blogs and users.

pub mod store;

pub use store::{BlogRepository, Database, InMemoryDatabase, PostgresDatabase, StoreError, UserRepository};
