//! Command-line argument definitions.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use crate::constants;

/// Wrap a USD layer in a new Scope prim that references it.
#[derive(Parser, Debug)]
#[command(
    name = "scope_reparent",
    author,
    version,
    about,
    long_about = None,
    override_usage = "scope_reparent <usdFilePath> [scopeName] [OPTIONS]"
)]
pub struct Args {
    /// USD layer to reparent
    #[arg(value_name = "usdFilePath")]
    pub usd_file_path: PathBuf,

    /// Name of the Scope prim to create (prompted for when omitted)
    #[arg(value_name = "scopeName")]
    pub scope_name: Option<String>,

    /// Configuration file (default: <config dir>/scope-reparent/config.toml)
    #[arg(long, value_name = "FILE", env = constants::ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    pub verbose: bool,

    /// Fail instead of replacing an existing output file
    #[arg(long)]
    pub no_clobber: bool,
}

/// Why parsing did not produce [`Args`].
#[derive(Debug)]
pub enum ArgsOutcome {
    /// `--help` or `--version`: print and exit successfully.
    Info(clap::Error),
    /// Wrong arguments: print usage and fail.
    Usage(clap::Error),
}

/// Parse `argv` (program name first).
pub fn parse<I, T>(argv: I) -> Result<Args, ArgsOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(argv).map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ArgsOutcome::Info(err),
        _ => ArgsOutcome::Usage(err),
    })
}
