//! Presentation layer handling terminal UI and user input.
//!
//! Renders the workflow views with ratatui and maps key presses onto
//! workflow actions and field edits.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
