use tracing::debug;

use crate::types::{ImportSummary, Key};

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// Parses `gpg --with-colons` output from `--list-keys` or
/// `--list-secret-keys` into primary keys, in listing order.
pub fn parse_keys(output: &str) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut current_key: Option<KeyBuilder> = None;
    let mut in_subkey = false;

    for line in output.lines() {
        let fields: Vec<&str> = line.split(':').collect();

        match fields[0] {
            record @ ("pub" | "sec") => {
                if let Some(builder) = current_key.take() {
                    push_built(&mut keys, builder);
                }
                current_key = Some(KeyBuilder {
                    has_secret: record == "sec",
                    ..Default::default()
                });
                in_subkey = false;
            }
            "fpr" if !in_subkey => {
                if let Some(ref mut builder) = current_key
                    && builder.fingerprint.is_none()
                    && fields.len() > 9
                    && !fields[9].is_empty()
                {
                    builder.fingerprint = Some(fields[9].to_uppercase());
                }
            }
            "uid" => {
                if let Some(ref mut builder) = current_key
                    && builder.uid.is_none()
                    && fields.len() > 9
                {
                    builder.uid = Some(fields[9].to_string());
                }
            }
            "sub" | "ssb" => {
                in_subkey = true;
            }
            "fpr" | "grp" | "uat" | "rev" | "rvk" | "sig" | "tru" | "cfg" => {
                debug!(
                    record_type = fields[0],
                    "skipping unhandled GPG record type"
                );
            }
            record if !record.is_empty() => {
                debug!(record_type = record, "skipping unknown GPG record type");
            }
            _ => {}
        }
    }

    if let Some(builder) = current_key {
        push_built(&mut keys, builder);
    }

    keys
}

fn push_built(keys: &mut Vec<Key>, builder: KeyBuilder) {
    match builder.build() {
        Some(key) => keys.push(key),
        None => debug!("skipping key: missing primary fingerprint"),
    }
}

/// Combines a public and a secret listing of the same keyring.
///
/// The public listing decides the order. Keys found in the secret listing
/// are marked as carrying secret material; any that have no public
/// counterpart are appended in secret-listing order.
pub fn merge_secret_keys(public: Vec<Key>, secret: Vec<Key>) -> Vec<Key> {
    let mut merged = public;
    for secret_key in secret {
        match merged
            .iter_mut()
            .find(|k| k.fingerprint == secret_key.fingerprint)
        {
            Some(key) => key.has_secret = true,
            None => merged.push(Key {
                has_secret: true,
                ..secret_key
            }),
        }
    }
    merged
}

/// Extracts the import counters from `gpg --status-fd` output.
///
/// Returns `None` if no `IMPORT_RES` status line is present, which happens
/// when GPG could not read any OpenPGP data at all.
pub fn parse_import_status(output: &str) -> Option<ImportSummary> {
    let line = output.lines().rev().find_map(|line| {
        line.strip_prefix(STATUS_PREFIX)?
            .strip_prefix("IMPORT_RES ")
    })?;

    let counts: Vec<u32> = line
        .split_whitespace()
        .map(|n| n.parse().unwrap_or(0))
        .collect();
    let at = |i: usize| counts.get(i).copied().unwrap_or(0);

    Some(ImportSummary {
        considered: at(0),
        imported: at(2),
        unchanged: at(4),
        secret_imported: at(10),
        secret_unchanged: at(11),
    })
}

#[derive(Default)]
struct KeyBuilder {
    fingerprint: Option<String>,
    uid: Option<String>,
    has_secret: bool,
}

impl KeyBuilder {
    fn build(self) -> Option<Key> {
        Some(Key {
            fingerprint: self.fingerprint?,
            uid: self.uid.unwrap_or_default(),
            has_secret: self.has_secret,
        })
    }
}
