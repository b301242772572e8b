//! Infrastructure layer: PDF serialization and file system access.
//!
//! Everything that turns report content into bytes or moves bytes in and out
//! of the process lives here.

pub mod pdf;
pub mod persistence;

pub use pdf::*;
pub use persistence::*;
