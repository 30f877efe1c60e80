//! Skel Types - Values, option schemas and errors shared by the call surface
//!
//! This crate contains the pure data structures that flow between callers,
//! the dispatcher and the worker pool. It has no threading of its own.

mod error;
mod options;
mod value;

pub use error::*;
pub use options::*;
pub use value::*;
