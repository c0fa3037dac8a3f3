//! Split a GPG keyring into several smaller keyrings.
//!
//! Every key of the source keyring is copied into one of N destination
//! keyrings, chosen by the first hex digit of its fingerprint modulo N.
//! All keyring work is done by the `gpg` executable; this crate only
//! lists, exports and imports keys through it.
//!
//! # Example
//!
//! ```no_run
//! use gpg_split_keyring::SplitConfig;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> gpg_split_keyring::Result<()> {
//!     let config = SplitConfig::new("/srv/keys/gnupg", "/srv/keys/part", 16)?;
//!     let tally = config.splitter().await?.run(|_| {}).await?;
//!
//!     println!("{tally}");
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - GnuPG 2.1 or later available as `gpg` (or configured via
//!   [`SplitConfig::gpg_program`])
//! - Read access to the source keyring and write access to the parent
//!   directory of the destination prefix

mod config;
mod error;
mod keyring;
mod parse;
mod partition;
mod split;
mod store;
mod types;
mod validation;

pub use config::SplitConfig;
pub use error::{Error, Result};
pub use keyring::GpgKeyring;
pub use partition::{bucket_index, bucket_path};
pub use split::{SplitProgress, Splitter};
pub use store::KeyStore;
pub use types::{ImportSummary, Key, Tally, TransferOutcome};
pub use validation::{validate_fingerprint, validate_partitions};
