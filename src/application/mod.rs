//! Application layer managing the workflow session and UI state.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the session state machine, the simulated pipeline, report generation and
//! the front end's interaction state.

pub mod pipeline;
pub mod report;
pub mod session;
pub mod state;

pub use pipeline::*;
pub use report::*;
pub use session::*;
pub use state::*;
