//! Wrap a USD layer in a new `Scope` prim that references it.
//!
//! The input layer is first given a default prim (chosen automatically or by
//! asking the user) so the reference resolves, then a sibling layer named
//! after the scope is written:
//!
//! ```text
//! #usda 1.0
//!
//! def Scope "assembly" (
//!     kind = "group"
//!     prepend references = @./scene.usda@
//! )
//! {
//! }
//! ```

pub mod cli;
pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod logging;
pub mod reparent;
pub mod stage;

pub use error::ReparentError;
