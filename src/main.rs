use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gpg_split_keyring::{Error, SplitConfig, SplitProgress};

/// Split a GPG keyring into several keyrings by fingerprint prefix.
#[derive(Parser, Debug)]
#[command(name = "gpg-split-keyring")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Home directory of the keyring to split.
    input_home: PathBuf,

    /// Prefix for the output keyrings; keyring i is created at <OUTPUT_BASE>i.
    output_base: PathBuf,

    /// Number of output keyrings.
    partitions: usize,

    /// GPG executable to run.
    #[arg(long, default_value = "gpg")]
    gpg: String,

    /// Copy public keys only, leaving secret key material behind.
    #[arg(long)]
    public_only: bool,

    /// Abort any single GPG invocation after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

const EXIT_SETUP: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only progress and the tally.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gpg_split_keyring=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match SplitConfig::new(cli.input_home, cli.output_base, cli.partitions) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };
    config.gpg_program = cli.gpg;
    config.include_secret = !cli.public_only;
    config.timeout_secs = cli.timeout_secs;

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_SETUP)
        }
    }
}

async fn run(config: &SplitConfig) -> Result<(), Error> {
    let splitter = config.splitter().await?;

    splitter
        .run(|progress| match progress {
            SplitProgress::Moving {
                fingerprint,
                bucket,
            } => println!("Moving key {fingerprint} into keyring {bucket}"),
            SplitProgress::Completed(tally) => println!("{tally}"),
            _ => {}
        })
        .await?;

    Ok(())
}
