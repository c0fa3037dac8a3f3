//! Bucket assignment for keys.
//!
//! A key's bucket is the value of the first hex digit of its primary
//! fingerprint, taken modulo the partition count. Fingerprints are uniformly
//! distributed, so with 16 partitions (or any divisor of 16) the buckets
//! come out roughly equal in size.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Number of distinct values the leading fingerprint digit can take.
pub const NIBBLE_VALUES: usize = 16;

/// Returns the bucket in `0..partitions` for a fingerprint.
pub fn bucket_index(fingerprint: &str, partitions: usize) -> Result<usize> {
    if partitions == 0 {
        return Err(Error::InvalidPartitionCount(partitions));
    }

    let nibble = fingerprint
        .chars()
        .next()
        .and_then(|c| c.to_digit(16))
        .ok_or_else(|| Error::InvalidFingerprint {
            fingerprint: fingerprint.to_string(),
            reason: "fingerprint must start with a hexadecimal digit".to_string(),
        })?;

    Ok(nibble as usize % partitions)
}

/// Home directory of bucket `index`: the prefix with the index appended,
/// e.g. `/srv/keys/part` becomes `/srv/keys/part3`.
pub fn bucket_path(prefix: &Path, index: usize) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(index.to_string());
    PathBuf::from(path)
}
