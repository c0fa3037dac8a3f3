use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::partition::{NIBBLE_VALUES, bucket_index};
use crate::store::KeyStore;
use crate::types::{Key, Tally, TransferOutcome};

/// Progress updates during a split run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SplitProgress {
    Starting {
        total_keys: usize,
    },
    Moving {
        fingerprint: String,
        bucket: usize,
    },
    Transferred {
        fingerprint: String,
        outcome: TransferOutcome,
    },
    /// The public key was copied but its secret material was not. This
    /// does not count as a failure.
    SecretSkipped {
        fingerprint: String,
        reason: String,
    },
    Completed(Tally),
}

/// Splits one keyring into several by fingerprint prefix.
///
/// The splitter owns the source keyring and one destination keyring per
/// bucket. Keys are moved strictly one after another; a failed export or
/// import is counted and the run goes on with the next key. Secret material
/// that cannot be exported or imported is skipped with a warning, leaving
/// the public key in place. Only failing to list the source keyring aborts
/// the run.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> gpg_split_keyring::Result<()> {
/// use gpg_split_keyring::SplitConfig;
///
/// let config = SplitConfig::new("/srv/keys/gnupg", "/srv/keys/part", 4)?;
/// let splitter = config.splitter().await?;
/// let tally = splitter.run(|_| {}).await?;
/// println!("{tally}");
/// # Ok(())
/// # }
/// ```
pub struct Splitter<S, D> {
    source: S,
    buckets: Vec<D>,
    include_secret: bool,
}

impl<S: KeyStore, D: KeyStore> Splitter<S, D> {
    /// Creates a splitter over already initialized bucket keyrings.
    ///
    /// The partition count is the number of buckets, which must be at
    /// least one.
    pub fn new(source: S, buckets: Vec<D>) -> Result<Self> {
        if buckets.is_empty() {
            return Err(Error::InvalidPartitionCount(0));
        }

        if buckets.len() > NIBBLE_VALUES {
            warn!(
                partitions = buckets.len(),
                "more partitions than fingerprint prefixes; buckets {} and above stay empty",
                NIBBLE_VALUES
            );
        }

        Ok(Self {
            source,
            buckets,
            include_secret: true,
        })
    }

    /// Whether secret key material is copied along with public keys.
    /// Enabled by default.
    #[must_use]
    pub fn include_secret(mut self, include: bool) -> Self {
        self.include_secret = include;
        self
    }

    pub fn partitions(&self) -> usize {
        self.buckets.len()
    }

    pub fn buckets(&self) -> &[D] {
        &self.buckets
    }

    /// Moves every key of the source keyring into its bucket.
    ///
    /// The callback receives progress updates as keys are processed.
    pub async fn run<F>(&self, mut callback: F) -> Result<Tally>
    where
        F: FnMut(SplitProgress),
    {
        let keys = self.source.list_keys().await?;
        info!(
            keys = keys.len(),
            partitions = self.partitions(),
            "splitting keyring"
        );
        callback(SplitProgress::Starting {
            total_keys: keys.len(),
        });

        let mut tally = Tally::default();
        for key in &keys {
            let outcome = match bucket_index(&key.fingerprint, self.partitions()) {
                Ok(bucket) => {
                    callback(SplitProgress::Moving {
                        fingerprint: key.fingerprint.clone(),
                        bucket,
                    });
                    let bucket = &self.buckets[bucket];
                    let outcome = self.transfer(key, bucket).await;
                    if outcome.is_success()
                        && self.include_secret
                        && key.has_secret
                        && let Err(reason) = self.transfer_secret(key, bucket).await
                    {
                        warn!(
                            fingerprint = %key.fingerprint,
                            %reason,
                            "secret key material not copied"
                        );
                        callback(SplitProgress::SecretSkipped {
                            fingerprint: key.fingerprint.clone(),
                            reason,
                        });
                    }
                    outcome
                }
                Err(e) => TransferOutcome::Unassigned(e.to_string()),
            };

            if !outcome.is_success() {
                warn!(fingerprint = %key.fingerprint, ?outcome, "key transfer failed");
            }
            tally.record(&outcome);
            callback(SplitProgress::Transferred {
                fingerprint: key.fingerprint.clone(),
                outcome,
            });
        }

        info!(
            success = tally.success,
            failure = tally.failure,
            "split finished"
        );
        callback(SplitProgress::Completed(tally));
        Ok(tally)
    }

    async fn transfer(&self, key: &Key, bucket: &D) -> TransferOutcome {
        let data = match self.source.export_key(&key.fingerprint).await {
            Ok(data) => data,
            Err(e) => return TransferOutcome::ExportFailed(e.to_string()),
        };

        match bucket.import_keys(&data).await {
            Ok(summary) => TransferOutcome::from_summary(summary),
            Err(e) => TransferOutcome::ImportFailed(e.to_string()),
        }
    }

    /// Secret material is imported on its own, after the public key, so its
    /// import counters never affect the public key's outcome.
    async fn transfer_secret(&self, key: &Key, bucket: &D) -> std::result::Result<(), String> {
        let data = self
            .source
            .export_secret_key(&key.fingerprint)
            .await
            .map_err(|e| e.to_string())?;

        let summary = bucket.import_keys(&data).await.map_err(|e| e.to_string())?;
        if summary.secret_accepted() {
            Ok(())
        } else {
            Err(format!("secret key not imported: {summary:?}"))
        }
    }
}
