pub mod appwrite;
pub mod manager;
pub mod models;
pub mod sqlite;
pub mod store;
pub mod tags;

pub use appwrite::AppwriteStore;
pub use manager::{bootstrap_admin, open_store, StoreError};
pub use sqlite::SqliteStore;
pub use store::ContentStore;
pub use tags::TagFormat;
