use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("command execution failed: {0}")]
    Command(#[from] io::Error),

    #[error("gpg exited with status {status}: {stderr}")]
    Gpg { status: i32, stderr: String },

    #[error("invalid fingerprint '{fingerprint}': {reason}")]
    InvalidFingerprint { fingerprint: String, reason: String },

    #[error("invalid partition count {0}: must be at least 1")]
    InvalidPartitionCount(usize),

    #[error("cannot create keyring directory '{}': {source}", path.display())]
    BucketPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("keyring not initialized")]
    KeyringNotInitialized,

    #[error("permission denied")]
    PermissionDenied,

    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("failed to open stdin of gpg subprocess")]
    StdinCaptureFailed,
}

pub type Result<T> = std::result::Result<T, Error>;
