//! Command-line interface module.
//!
//! Resolves arguments, then runs the pipeline: open the input stage, make
//! sure it has a default prim, write the container layer.

pub mod args;

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::console::Console;
use crate::constants;
use crate::error::ReparentError;
use crate::logging;
use crate::reparent::{DefaultRootGuarantor, ReparentWriter};
use crate::stage::UsdStage;

pub use args::{Args, ArgsOutcome};

/// Run the tool on `argv` and map the result to a process exit status.
///
/// Every failure is reported once through `console` as `Error: ...`.
pub fn run<I, T>(argv: I, console: &mut dyn Console) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match args::parse(argv) {
        Ok(args) => args,
        Err(ArgsOutcome::Info(info)) => {
            let _ = info.print();
            return constants::EXIT_SUCCESS;
        }
        Err(ArgsOutcome::Usage(err)) => {
            debug!(error = %err, "argument parsing failed");
            console.error(&ReparentError::Usage.to_string());
            return constants::EXIT_FAILURE;
        }
    };

    match execute(&args, console) {
        Ok(output) => {
            debug!(path = %output.display(), "done");
            constants::EXIT_SUCCESS
        }
        Err(err) => {
            console.error(&err.to_string());
            constants::EXIT_FAILURE
        }
    }
}

/// Run the pipeline for parsed arguments. Returns the written layer's path.
pub fn execute(args: &Args, console: &mut dyn Console) -> Result<PathBuf, ReparentError> {
    let (config, source) = Config::load(args.config.as_deref())?;
    let env_level = env::var(constants::ENV_LOG_LEVEL).ok();
    logging::init(logging::resolve_level(
        args.log_level.as_deref(),
        args.verbose,
        env_level.as_deref(),
        config.log_level.as_deref(),
    ));
    info!("{} v{} starting", constants::APP_NAME, constants::APP_VERSION);
    debug!(%source, "loaded configuration");

    let scope_name = resolve_scope_name(args.scope_name.clone(), console)?;
    let writer = ReparentWriter::new(config.writer.overwrite && !args.no_clobber);
    // Reject the name before the input can be given a default prim.
    writer.prepare(&args.usd_file_path, &scope_name)?;

    {
        let mut stage =
            UsdStage::open(&args.usd_file_path).map_err(|source| ReparentError::StageOpen {
                path: args.usd_file_path.clone(),
                source,
            })?;
        DefaultRootGuarantor::from_config(&config.guarantor).ensure(&mut stage, console)?;
    }

    writer.write(&args.usd_file_path, &scope_name)
}

/// Use the given scope name or ask for one.
///
/// The answer is taken as typed; the writer validates it.
pub fn resolve_scope_name(
    scope_name: Option<String>,
    console: &mut dyn Console,
) -> Result<String, ReparentError> {
    if let Some(name) = scope_name {
        return Ok(name);
    }
    console
        .prompt(constants::PROMPT_SCOPE_NAME)?
        .ok_or(ReparentError::InputClosed("the scope prim name"))
}
