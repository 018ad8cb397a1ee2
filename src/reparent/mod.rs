//! The reparent pipeline: default prim guarantee, then the container layer.

pub mod guarantor;
pub mod writer;

pub use guarantor::DefaultRootGuarantor;
pub use writer::{derive_output_path, derive_reference_target, ReparentWriter};
