//! MongoDB persistence

pub mod listings;
pub mod mongo;
pub mod schemas;

pub use listings::MongoListingStore;
pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};
