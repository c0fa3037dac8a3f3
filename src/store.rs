use crate::error::Result;
use crate::types::{ImportSummary, Key};

/// Operations the splitter needs from a keyring.
///
/// [`GpgKeyring`] implements this by driving the `gpg` executable. Tests
/// substitute in-memory keyrings.
///
/// [`GpgKeyring`]: crate::GpgKeyring
#[allow(async_fn_in_trait)]
pub trait KeyStore {
    /// Lists every primary key, public and secret, in a stable order.
    async fn list_keys(&self) -> Result<Vec<Key>>;

    /// Exports the unarmored public key material for one key.
    async fn export_key(&self, fingerprint: &str) -> Result<Vec<u8>>;

    /// Exports the unarmored secret key material for one key.
    ///
    /// Fails if the keyring holds no secret for the key or is not allowed
    /// to release it.
    async fn export_secret_key(&self, fingerprint: &str) -> Result<Vec<u8>>;

    /// Imports OpenPGP data and reports what the keyring did with it.
    async fn import_keys(&self, data: &[u8]) -> Result<ImportSummary>;
}
