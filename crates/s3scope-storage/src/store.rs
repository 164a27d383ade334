use std::future::Future;

use crate::StorageError;

/// Remote storage that can list keys by prefix and fetch objects by key
pub trait ObjectStore {
    /// All keys under `bucket` starting with `prefix`, in storage order
    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;

    /// Raw bytes of one object
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send;
}

/// Opens an [`ObjectStore`] session for a named credential profile
pub trait Connector {
    type Store: ObjectStore;

    fn open(&self, profile: &str) -> impl Future<Output = Result<Self::Store, StorageError>> + Send;
}

/// Source of named credential profiles
pub trait ProfileResolver {
    fn available_profiles(&self) -> Vec<String>;
}
