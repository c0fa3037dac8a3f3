use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parse::{merge_secret_keys, parse_import_status, parse_keys};
use crate::store::KeyStore;
use crate::types::{ImportSummary, Key};
use crate::validation::validate_fingerprint;

const DEFAULT_GPG_PROGRAM: &str = "gpg";

/// A GPG keyring addressed by its home directory.
///
/// Every operation spawns the `gpg` executable with `--homedir` pointing at
/// this keyring, so several `GpgKeyring`s can be used side by side without
/// touching the user's default keyring.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> gpg_split_keyring::Result<()> {
/// use gpg_split_keyring::{GpgKeyring, KeyStore};
///
/// let keyring = GpgKeyring::new("/srv/keys/gnupg");
/// for key in keyring.list_keys().await? {
///     println!("{} {}", key.fingerprint, key.uid);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GpgKeyring {
    homedir: PathBuf,
    program: String,
    timeout_secs: Option<u64>,
}

impl GpgKeyring {
    /// Creates a handle for the keyring in `homedir`. Nothing is touched on
    /// disk until an operation runs.
    #[must_use]
    pub fn new(homedir: impl Into<PathBuf>) -> Self {
        Self {
            homedir: homedir.into(),
            program: DEFAULT_GPG_PROGRAM.to_string(),
            timeout_secs: None,
        }
    }

    /// Uses a different GPG executable, e.g. `gpg2` or an absolute path.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Limits every single GPG invocation to `secs` seconds.
    #[must_use]
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn homedir(&self) -> &Path {
        &self.homedir
    }

    /// Creates the home directory if it does not exist yet.
    ///
    /// An existing directory is left untouched. The parent directory must
    /// already exist. New directories are created with mode `0700`.
    pub async fn ensure_home(&self) -> Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        #[cfg(unix)]
        builder.mode(0o700);

        match builder.create(&self.homedir).await {
            Ok(()) => {
                debug!(homedir = %self.homedir.display(), "created keyring directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let metadata = tokio::fs::metadata(&self.homedir).await.map_err(|source| {
                    Error::BucketPath {
                        path: self.homedir.clone(),
                        source,
                    }
                })?;
                if metadata.is_dir() {
                    debug!(homedir = %self.homedir.display(), "keyring directory already exists");
                    Ok(())
                } else {
                    Err(Error::BucketPath {
                        path: self.homedir.clone(),
                        source: std::io::Error::other("path exists and is not a directory"),
                    })
                }
            }
            Err(source) => Err(Error::BucketPath {
                path: self.homedir.clone(),
                source,
            }),
        }
    }

    fn gpg(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.env("LC_ALL", "C")
            .arg("--homedir")
            .arg(&self.homedir)
            .args(["--batch", "--no-tty"])
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, cmd: &mut Command) -> Result<Output> {
        debug!(command = ?cmd.as_std(), "running gpg");
        let output = cmd.output();

        match self.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), output)
                .await
                .map_err(|_| Error::Timeout(secs))?
                .map_err(Error::from),
            None => Ok(output.await?),
        }
    }

    async fn run_checked(&self, cmd: &mut Command) -> Result<Vec<u8>> {
        let output = self.run(cmd).await?;

        if !output.status.success() {
            return Err(self.check_error(output.status, &output.stderr));
        }

        Ok(output.stdout)
    }

    async fn list_colons(&self, listing: &str) -> Result<Vec<Key>> {
        let stdout = self
            .run_checked(
                self.gpg()
                    .args([listing, "--with-colons", "--fixed-list-mode"]),
            )
            .await?;
        Ok(parse_keys(&String::from_utf8_lossy(&stdout)))
    }

    async fn import_inner(&self, data: &[u8]) -> Result<ImportSummary> {
        let mut child = self
            .gpg()
            .args(["--status-fd=1", "--import"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child.stdin.take().ok_or(Error::StdinCaptureFailed)?;
        let write = async move {
            stdin.write_all(data).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        let status = String::from_utf8_lossy(&output.stdout);
        if let Some(summary) = parse_import_status(&status) {
            return Ok(summary);
        }

        if !output.status.success() {
            return Err(self.check_error(output.status, &output.stderr));
        }

        written?;
        Ok(ImportSummary::default())
    }

    fn check_error(&self, status: std::process::ExitStatus, stderr: &[u8]) -> Error {
        check_gpg_error(&self.homedir, status, stderr)
    }
}

impl KeyStore for GpgKeyring {
    /// Lists public keys, then marks the ones that also have secret
    /// material.
    ///
    /// Fails with [`Error::KeyringNotInitialized`] if the home directory
    /// does not exist, instead of letting GPG create an empty one.
    async fn list_keys(&self) -> Result<Vec<Key>> {
        match tokio::fs::metadata(&self.homedir).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Err(Error::KeyringNotInitialized),
        }

        let public = self.list_colons("--list-keys").await?;
        let secret = self.list_colons("--list-secret-keys").await?;
        debug!(
            homedir = %self.homedir.display(),
            public = public.len(),
            secret = secret.len(),
            "listed keyring"
        );

        Ok(merge_secret_keys(public, secret))
    }

    async fn export_key(&self, fingerprint: &str) -> Result<Vec<u8>> {
        let validated = validate_fingerprint(fingerprint)?;

        let data = self
            .run_checked(self.gpg().args(["--export", validated.as_str()]))
            .await?;

        if data.is_empty() {
            return Err(Error::KeyNotFound(validated));
        }

        Ok(data)
    }

    /// Exports secret material with an empty loopback passphrase, so keys
    /// protected by a passphrase fail here instead of prompting.
    async fn export_secret_key(&self, fingerprint: &str) -> Result<Vec<u8>> {
        let validated = validate_fingerprint(fingerprint)?;

        let data = self
            .run_checked(self.gpg().args([
                "--pinentry-mode",
                "loopback",
                "--passphrase",
                "",
                "--export-secret-keys",
                validated.as_str(),
            ]))
            .await?;

        if data.is_empty() {
            return Err(Error::KeyNotFound(validated));
        }

        Ok(data)
    }

    async fn import_keys(&self, data: &[u8]) -> Result<ImportSummary> {
        match self.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), self.import_inner(data))
                .await
                .map_err(|_| Error::Timeout(secs))?,
            None => self.import_inner(data).await,
        }
    }
}

fn check_gpg_error(homedir: &Path, status: std::process::ExitStatus, stderr: &[u8]) -> Error {
    let msg = String::from_utf8_lossy(stderr);

    if msg.contains("Permission denied") || msg.contains("permission denied") {
        return Error::PermissionDenied;
    }

    if msg.contains("No such file or directory") && msg.contains(&*homedir.to_string_lossy()) {
        return Error::KeyringNotInitialized;
    }

    Error::Gpg {
        status: status.code().unwrap_or(-1),
        stderr: msg.to_string(),
    }
}
