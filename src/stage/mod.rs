//! Scene stage abstraction.
//!
//! The reparent pipeline talks to scene files through [`SceneStage`], the
//! small slice of a scene-description library it needs: default prim
//! access, pseudo-root children, prim definition and saving. [`UsdStage`]
//! implements it for text and binary crate layers.

mod layer;
pub mod prim;
pub mod scene;
pub mod usda;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use layer::UsdStage;
pub use prim::{PrimSpec, Specifier};
pub use scene::LayerFormat;

/// Errors raised by a stage backend.
///
/// Messages leave out the layer path; callers report which file failed.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{0}")]
    Read(#[source] io::Error),

    #[error("{0}")]
    Write(#[source] io::Error),

    #[error("not a USD layer: neither a binary crate nor UTF-8 text")]
    NotText,

    #[error("{reason}")]
    Parse { reason: String },

    #[error("cannot edit the layer metadata: {0}")]
    Syntax(#[source] usda::SyntaxError),

    #[error("binary crate layers cannot be edited; convert the layer to .usda first")]
    CrateReadOnly,

    #[error("cannot create a layer at {}: {reason}", .path.display())]
    Uncreatable { path: PathBuf, reason: String },

    #[error("invalid prim path '{0}'")]
    InvalidPrimPath(String),

    #[error("prim {0} is already defined")]
    DuplicatePrim(String),

    #[error("no prim named '{0}' under the pseudo-root")]
    UnknownPrim(String),
}

/// An open scene document.
///
/// Handles are owned by whoever opened them and close when dropped.
pub trait SceneStage {
    /// File backing this stage.
    fn path(&self) -> &Path;

    /// Name of the default prim, if one is set and a root prim spec of that
    /// name exists, whatever its specifier or activation.
    fn default_prim(&self) -> Option<&str>;

    /// Designate a root prim as the default prim.
    fn set_default_prim(&mut self, name: &str) -> Result<(), StageError>;

    /// Names of the pseudo-root's children visited by the default
    /// traversal (defined and active), in child order. `None` when the
    /// stage has no pseudo-root.
    fn root_children(&self) -> Option<Vec<String>>;

    /// Define a typed prim at `path`.
    fn define_prim(&mut self, path: &str, type_name: &str) -> Result<&mut PrimSpec, StageError>;

    /// Write pending changes to the backing file.
    fn save(&mut self) -> Result<(), StageError>;
}
