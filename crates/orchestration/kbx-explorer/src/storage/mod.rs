//! Storage backends implementing [`kbx_traits::BackupStore`].
//!
//! - [`S3Storage`] - ListObjectsV2 with a `/` delimiter, with LocalStack support
//! - [`ObjectStoreStorage`] - any `object_store` backend (local filesystem, in-memory)
//!
//! Both report partition keys with a trailing `/` and return one level's
//! entries sorted by key.

mod object_store;
mod s3;

pub use self::object_store::ObjectStoreStorage;
pub use self::s3::{create_s3_client, S3Config, S3Storage};
