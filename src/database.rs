pub mod db;
pub mod repository;
pub mod sqlite_store;

pub use sqlite_store::SqliteDocumentStore;
