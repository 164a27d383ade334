/// Errors that abort a connect or listing step
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("profile '{0}' not found in credential configuration")]
    ProfileNotFound(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("object '{key}' not found in bucket '{bucket}'")]
    ObjectNotFound { bucket: String, key: String },
}

/// Reasons a single object could not be turned into text
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to retrieve {object}: {source}")]
    Transport {
        object: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to decompress {object}: {source}")]
    Decompress {
        object: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{object} is not valid UTF-8: {source}")]
    Encoding {
        object: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}
