use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::keyring::GpgKeyring;
use crate::partition::bucket_path;
use crate::split::Splitter;
use crate::validation::validate_partitions;

/// Settings for one split run.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Home directory of the keyring to split.
    pub input_home: PathBuf,
    /// Prefix of the bucket home directories; bucket `i` lives at
    /// `<output_base><i>`.
    pub output_base: PathBuf,
    pub partitions: usize,
    /// GPG executable used for every keyring.
    pub gpg_program: String,
    /// Copy secret key material along with public keys.
    pub include_secret: bool,
    /// Per-invocation GPG timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl SplitConfig {
    pub fn new(
        input_home: impl Into<PathBuf>,
        output_base: impl Into<PathBuf>,
        partitions: usize,
    ) -> Result<Self> {
        Ok(Self {
            input_home: input_home.into(),
            output_base: output_base.into(),
            partitions: validate_partitions(partitions)?,
            gpg_program: "gpg".to_string(),
            include_secret: true,
            timeout_secs: None,
        })
    }

    fn keyring(&self, homedir: &Path) -> GpgKeyring {
        GpgKeyring::new(homedir)
            .with_program(self.gpg_program.as_str())
            .with_timeout(self.timeout_secs)
    }

    pub fn source(&self) -> GpgKeyring {
        self.keyring(&self.input_home)
    }

    pub fn bucket_paths(&self) -> Vec<PathBuf> {
        (0..self.partitions)
            .map(|i| bucket_path(&self.output_base, i))
            .collect()
    }

    /// Creates every bucket home directory, leaving existing ones alone.
    ///
    /// Stops at the first directory that cannot be created.
    pub async fn create_buckets(&self) -> Result<Vec<GpgKeyring>> {
        let mut buckets = Vec::with_capacity(self.partitions);
        for path in self.bucket_paths() {
            let keyring = self.keyring(&path);
            keyring.ensure_home().await?;
            buckets.push(keyring);
        }
        Ok(buckets)
    }

    /// Initializes the buckets and returns a splitter ready to run.
    pub async fn splitter(&self) -> Result<Splitter<GpgKeyring, GpgKeyring>> {
        let buckets = self.create_buckets().await?;
        Ok(Splitter::new(self.source(), buckets)?.include_secret(self.include_secret))
    }
}
