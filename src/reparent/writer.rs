//! Container layer writer.
//!
//! Writes `<dir>/<scope>.<ext>` next to the input, holding a single `Scope`
//! prim of kind `group` that references the input layer by a relative path.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::WriterConfig;
use crate::constants;
use crate::error::ReparentError;
use crate::stage::prim::is_valid_identifier;
use crate::stage::{SceneStage, UsdStage};

/// Extension used when the input file has none, or is a binary crate.
const TEXT_EXTENSION: &str = "usda";
const CRATE_EXTENSION: &str = "usdc";

/// Make `path` absolute against the current directory without touching the
/// filesystem.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Sibling path `<parent>/<scope_name>.<ext>` of the input layer.
///
/// The container is always written as text, so a `.usdc` input gets a
/// `.usda` sibling.
pub fn derive_output_path(original: &Path, scope_name: &str) -> io::Result<PathBuf> {
    let absolute = absolutize(original)?;
    let extension = absolute
        .extension()
        .map(|ext| ext.to_string_lossy())
        .filter(|ext| !ext.eq_ignore_ascii_case(CRATE_EXTENSION))
        .unwrap_or_else(|| TEXT_EXTENSION.into());
    let parent = absolute.parent().unwrap_or_else(|| Path::new("/"));
    Ok(parent.join(format!("{scope_name}.{extension}")))
}

/// Reference target relative to the output layer: `./<stem>.<ext>`.
///
/// The output is always written in the input's directory, so the file name
/// alone resolves.
pub fn derive_reference_target(original: &Path) -> String {
    let name = original
        .file_name()
        .map_or_else(|| original.to_string_lossy(), |name| name.to_string_lossy());
    format!("./{name}")
}

/// Create the container layer at `output` and save it.
pub fn create_output_stage(
    output: &Path,
    scope_name: &str,
    reference_target: &str,
) -> Result<(), ReparentError> {
    let mut stage =
        UsdStage::create_new(output).map_err(|source| ReparentError::StageCreate {
            path: output.to_path_buf(),
            source,
        })?;

    let prim_path = format!("/{scope_name}");
    let prim = stage
        .define_prim(&prim_path, constants::CONTAINER_TYPE)
        .map_err(|err| ReparentError::EntityDefine {
            path: prim_path.clone(),
            reason: err.to_string(),
        })?;
    prim.set_kind(constants::CONTAINER_KIND);
    prim.add_reference(reference_target);

    stage.save().map_err(|source| ReparentError::StageWrite {
        path: output.to_path_buf(),
        source,
    })
}

/// Writes the container layer for an input whose default prim is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReparentWriter {
    overwrite: bool,
}

impl Default for ReparentWriter {
    fn default() -> Self {
        Self::from_config(&WriterConfig::default())
    }
}

impl ReparentWriter {
    pub const fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    pub const fn from_config(config: &WriterConfig) -> Self {
        Self::new(config.overwrite)
    }

    /// Check that a container named `scope_name` can be written next to
    /// `original` and return its path. Nothing is created.
    pub fn prepare(&self, original: &Path, scope_name: &str) -> Result<PathBuf, ReparentError> {
        if !is_valid_identifier(scope_name) {
            return Err(ReparentError::EntityDefine {
                path: format!("/{scope_name}"),
                reason: "prim names must start with a letter or underscore and contain only \
                         letters, digits and underscores"
                    .to_string(),
            });
        }

        let output = derive_output_path(original, scope_name)?;
        if output == absolutize(original)? {
            return Err(ReparentError::OutputIsInput { path: output });
        }
        if !self.overwrite && output.exists() {
            return Err(ReparentError::OutputExists { path: output });
        }
        Ok(output)
    }

    /// Write the container layer and return its path.
    ///
    /// Runs [`Self::prepare`] first, so a bad name never leaves a file
    /// behind.
    pub fn write(&self, original: &Path, scope_name: &str) -> Result<PathBuf, ReparentError> {
        let output = self.prepare(original, scope_name)?;
        if output.exists() {
            warn!(path = %output.display(), "overwriting existing file");
        }

        let target = derive_reference_target(original);
        create_output_stage(&output, scope_name, &target)?;
        info!(path = %output.display(), reference = %target, "wrote container layer");
        Ok(output)
    }
}
