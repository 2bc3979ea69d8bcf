pub mod store;

pub use store::{BucketStore, StoreError};
