use std::fmt;

/// A primary key listed from a GPG keyring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Primary key fingerprint, upper-case hex.
    pub fingerprint: String,
    pub uid: String,
    /// Whether the keyring also holds secret material for this key.
    pub has_secret: bool,
}

/// Counters reported by GPG for a single import operation.
///
/// Values come from the `IMPORT_RES` status line emitted with `--status-fd`.
/// Fields GPG reports but this crate has no use for are not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub considered: u32,
    pub imported: u32,
    pub unchanged: u32,
    pub secret_imported: u32,
    pub secret_unchanged: u32,
}

impl ImportSummary {
    /// Whether the keyring now holds the secret material it was given,
    /// either freshly imported or already present.
    pub fn secret_accepted(&self) -> bool {
        self.secret_imported + self.secret_unchanged > 0
    }
}

/// Result of moving one key into its destination keyring.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransferOutcome {
    Imported,
    Unchanged,
    /// GPG accepted the data but did not report a single imported or
    /// unchanged key.
    Rejected(ImportSummary),
    /// The fingerprint could not be mapped to a bucket.
    Unassigned(String),
    ExportFailed(String),
    ImportFailed(String),
}

impl TransferOutcome {
    /// Classifies the import of a single public key: exactly one key newly
    /// imported or exactly one key already present counts as success.
    pub fn from_summary(summary: ImportSummary) -> Self {
        if summary.imported == 1 {
            Self::Imported
        } else if summary.unchanged == 1 {
            Self::Unchanged
        } else {
            Self::Rejected(summary)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Imported | Self::Unchanged)
    }
}

/// Success and failure counts for one split run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub success: usize,
    pub failure: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: &TransferOutcome) {
        if outcome.is_success() {
            self.success += 1;
        } else {
            self.failure += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.failure
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success: {}", self.success)?;
        write!(f, "Failure: {}", self.failure)
    }
}
