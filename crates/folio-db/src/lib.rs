pub mod memory;
pub mod messages;
pub mod migrate;
pub mod store;
pub mod timeline;
pub mod types;

pub use sqlx::postgres::PgPool;
pub use store::{DocumentStore, PgDocumentStore, StoreError};
pub use types::*;
