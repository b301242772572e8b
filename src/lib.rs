//! regintel - Regulatory Intelligence Report Generator
//!
//! Runs a simulated analysis over regulatory-update records, lets the user
//! annotate each record and exports a PDF report grouped by impact level.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
