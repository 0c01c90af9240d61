/// Database model definitions.
pub mod models;
/// Selection persistence and lookup operations.
pub mod selection_store;
/// Storage abstraction layer for database operations.
pub mod storage;
