//! Application-wide constants.
//!
//! Prompts, messages and the USD vocabulary used by the reparent pipeline.

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Exit Status ===

pub const EXIT_SUCCESS: u8 = 0;
/// Any checked failure.
pub const EXIT_FAILURE: u8 = 1;

// === Path Configuration ===

/// Name of the configuration subdirectory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "scope-reparent";
/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// === Environment ===

/// Overrides the configuration file location.
pub const ENV_CONFIG: &str = "SCOPE_REPARENT_CONFIG";
/// Overrides the log level.
pub const ENV_LOG_LEVEL: &str = "SCOPE_REPARENT_LOG_LEVEL";

// === Scene Vocabulary ===

/// Prim names a DCC or pipeline adds for metadata purposes. They can never
/// be the default prim.
pub const DEFAULT_BLACKLIST: [&str; 2] = ["HoudiniLayerInfo", "MetadataInfo"];
/// Schema type of the container prim.
pub const CONTAINER_TYPE: &str = "Scope";
/// Model kind assigned to the container prim.
pub const CONTAINER_KIND: &str = "group";
/// Header line written to new text layers.
pub const USDA_HEADER: &str = "#usda 1.0";
/// Magic bytes at the start of a binary crate file.
pub const USDC_MAGIC: &[u8] = b"PXR-USDC";
/// Default log level when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// === Prompts ===

pub const PROMPT_SCOPE_NAME: &str = "Please enter the name of the scope prim you'd like to create: ";
pub const PROMPT_DEFAULT_PRIM: &str = "Enter the number of the default prim: ";
pub const HEADER_CHOOSE_DEFAULT_PRIM: &str = "Choose a default prim:";
pub const MSG_INVALID_NUMBER: &str = "Invalid input. Please enter a number.";

// === Error Messages ===

/// Prefix of every message written to stderr.
pub const ERROR_PREFIX: &str = "Error: ";
pub const USAGE: &str = "Usage: scope_reparent <usdFilePath> [scopeName]";
