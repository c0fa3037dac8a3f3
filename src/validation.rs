use crate::error::{Error, Result};

/// Validates a partition count.
///
/// Any count of at least one is accepted. Counts above 16 are valid but
/// leave the buckets past index 15 empty.
pub fn validate_partitions(count: usize) -> Result<usize> {
    if count == 0 {
        return Err(Error::InvalidPartitionCount(count));
    }
    Ok(count)
}

/// Validates a primary key fingerprint before passing it to a subprocess.
///
/// Accepted formats:
/// - 40 hex characters (v4 fingerprint)
/// - 64 hex characters (v5 and v6 fingerprints)
/// - Either of the above with "0x" prefix
///
/// Returns the normalized fingerprint (uppercase, no prefix) on success.
pub fn validate_fingerprint(fingerprint: &str) -> Result<String> {
    if fingerprint.is_empty() {
        return Err(Error::InvalidFingerprint {
            fingerprint: fingerprint.to_string(),
            reason: "fingerprint cannot be empty".to_string(),
        });
    }

    let normalized = fingerprint
        .strip_prefix("0x")
        .or_else(|| fingerprint.strip_prefix("0X"))
        .unwrap_or(fingerprint)
        .to_uppercase();

    if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidFingerprint {
            fingerprint: fingerprint.to_string(),
            reason: "fingerprint must contain only hexadecimal characters".to_string(),
        });
    }

    match normalized.len() {
        40 | 64 => Ok(normalized),
        len => Err(Error::InvalidFingerprint {
            fingerprint: fingerprint.to_string(),
            reason: format!("fingerprint must be 40 or 64 hex characters (got {len})"),
        }),
    }
}
