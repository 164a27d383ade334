use std::io::Read;

use flate2::read::MultiGzDecoder;

use s3scope_types::ObjectRef;

use crate::{Connector, FetchError, ObjectStore, ProfileResolver, StorageError};

/// Result of fetching one object. Failures carry their reason but read as
/// empty content, so one bad object never aborts a batch.
#[derive(Debug)]
pub enum FetchOutcome {
    Content(String),
    Failed(FetchError),
}

impl FetchOutcome {
    /// Decompressed text, or empty on failure
    pub fn content(&self) -> &str {
        match self {
            Self::Content(text) => text,
            Self::Failed(_) => "",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Lists and retrieves compressed log objects for one credential profile
pub struct RemoteObjectFetcher<S> {
    store: S,
    profile: String,
}

impl<S: ObjectStore> RemoteObjectFetcher<S> {
    /// Open a session for `profile`, which must be known to `resolver`
    pub async fn connect<R, C>(resolver: &R, connector: &C, profile: &str) -> Result<Self, StorageError>
    where
        R: ProfileResolver,
        C: Connector<Store = S>,
    {
        if !resolver.available_profiles().iter().any(|p| p == profile) {
            return Err(StorageError::ProfileNotFound(profile.to_string()));
        }

        let store = connector.open(profile).await?;
        tracing::info!(profile, "connected to remote storage");

        Ok(Self::with_store(store, profile))
    }

    /// Wrap an already opened store
    pub fn with_store(store: S, profile: &str) -> Self {
        Self {
            store,
            profile: profile.to_string(),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Log objects under `bucket`/`prefix`, in storage order
    pub async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, StorageError> {
        let keys = self.store.list_objects(bucket, prefix).await?;
        let total = keys.len();

        let objects: Vec<ObjectRef> = keys
            .into_iter()
            .map(|key| ObjectRef::new(bucket, key))
            .filter(ObjectRef::is_log_object)
            .collect();

        tracing::debug!(bucket, prefix, total, matched = objects.len(), "listed objects");
        Ok(objects)
    }

    /// Retrieve, decompress and decode one object
    pub async fn fetch(&self, object: &ObjectRef) -> Result<String, FetchError> {
        let bytes = self
            .store
            .get_object(&object.bucket, &object.key)
            .await
            .map_err(|source| FetchError::Transport {
                object: object.to_string(),
                source,
            })?;

        let raw = decompress(&bytes).map_err(|source| FetchError::Decompress {
            object: object.to_string(),
            source,
        })?;

        String::from_utf8(raw).map_err(|source| FetchError::Encoding {
            object: object.to_string(),
            source,
        })
    }

    /// Like [`fetch`](Self::fetch), but failures are logged and reported as an outcome
    pub async fn fetch_and_decompress(&self, object: &ObjectRef) -> FetchOutcome {
        match self.fetch(object).await {
            Ok(text) => FetchOutcome::Content(text),
            Err(err) => {
                tracing::warn!(object = %object, error = %err, "failed to load log object");
                FetchOutcome::Failed(err)
            }
        }
    }
}

/// Decompress a gzip stream, including concatenated members
pub fn decompress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Keep objects whose file name is one of `names`, in listing order
pub fn select_by_file_name(objects: &[ObjectRef], names: &[String]) -> Vec<ObjectRef> {
    objects
        .iter()
        .filter(|o| names.iter().any(|n| n == o.file_name()))
        .cloned()
        .collect()
}
