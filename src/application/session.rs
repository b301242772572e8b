//! Per-user workflow session and its state machine.
//!
//! ```text
//! Idle --Run Analysis--> Running --ok--> Complete --Reset--> Idle
//!                           \--error--> Failure  --Retry--> Idle
//! ```
//!
//! Every handler takes the session by `&mut` and either performs a valid
//! transition or returns [`WorkflowError`] leaving the session untouched.

use std::fmt;
use std::time::Instant;

use thiserror::Error;

use super::pipeline::{AnalysisPipeline, Clock};
use super::report::generate_report;
use crate::domain::{EditMap, ReportArtifact, UpdateRecord};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Running,
    Complete,
    Failure,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Idle => write!(f, "Idle"),
            WorkflowState::Running => write!(f, "Running"),
            WorkflowState::Complete => write!(f, "Complete"),
            WorkflowState::Failure => write!(f, "Failure"),
        }
    }
}

/// User-facing controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RunAnalysis,
    DownloadPdf,
    Reset,
    Retry,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::RunAnalysis => write!(f, "Run Analysis"),
            Action::DownloadPdf => write!(f, "Download PDF"),
            Action::Reset => write!(f, "Reset"),
            Action::Retry => write!(f, "Retry"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{action} is not available while the workflow is {state}")]
    InvalidAction { action: Action, state: WorkflowState },
    #[error("The analysis pipeline only executes while Running (current state: {0})")]
    NotRunning(WorkflowState),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// What the front end should draw for the current session snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Idle,
    Running,
    Complete,
    Failure,
    /// The session fields contradict the state; only Retry is offered.
    Fallback,
}

/// Session state: workflow state, result set, edit maps, log and last error.
///
/// `results` is present only in `Complete`; `error` only in `Failure`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session {
    pub state: WorkflowState,
    pub results: Option<Vec<UpdateRecord>>,
    pub rationales: EditMap,
    pub affected: EditMap,
    pub logs: Vec<String>,
    pub error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the fields agree with the current state.
    pub fn is_consistent(&self) -> bool {
        match self.state {
            WorkflowState::Idle | WorkflowState::Running => self.results.is_none() && self.error.is_none(),
            WorkflowState::Complete => self.results.is_some() && self.error.is_none(),
            WorkflowState::Failure => self.results.is_none() && self.error.is_some(),
        }
    }

    pub fn view(&self) -> View {
        if !self.is_consistent() {
            return View::Fallback;
        }
        match self.state {
            WorkflowState::Idle => View::Idle,
            WorkflowState::Running => View::Running,
            WorkflowState::Complete => View::Complete,
            WorkflowState::Failure => View::Failure,
        }
    }

    pub fn available_actions(&self) -> &'static [Action] {
        match self.view() {
            View::Idle => &[Action::RunAnalysis],
            View::Running => &[],
            View::Complete => &[Action::DownloadPdf, Action::Reset],
            View::Failure | View::Fallback => &[Action::Retry],
        }
    }

    pub fn is_available(&self, action: Action) -> bool {
        self.available_actions().contains(&action)
    }

    fn ensure_available(&self, action: Action) -> WorkflowResult<()> {
        if self.is_available(action) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidAction { action, state: self.state })
        }
    }

    /// `Idle` → `Running`.
    pub fn run_analysis(&mut self) -> WorkflowResult<()> {
        self.ensure_available(Action::RunAnalysis)?;
        self.state = WorkflowState::Running;
        self.error = None;
        tracing::info!("Analysis started");
        Ok(())
    }

    /// Runs the pipeline to completion and moves to `Complete` or `Failure`.
    ///
    /// Pipeline errors never escape: they are logged, stored in `error` and
    /// routed to `Failure`.
    pub fn execute_pipeline(&mut self, pipeline: &AnalysisPipeline, clock: &dyn Clock) -> WorkflowResult<()> {
        if self.state != WorkflowState::Running {
            return Err(WorkflowError::NotRunning(self.state));
        }

        let started = Instant::now();
        match pipeline.run(clock, &mut self.logs) {
            Ok(results) => {
                let elapsed = started.elapsed().as_secs_f64();
                self.logs.push(format!("Analysis complete in {elapsed:.2} seconds."));
                self.capture_displayed_fields(&results);
                tracing::info!(records = results.len(), elapsed_secs = elapsed, "Analysis complete");
                self.results = Some(results);
                self.error = None;
                self.state = WorkflowState::Complete;
            }
            Err(err) => {
                self.logs.push(format!("Error: {err}"));
                tracing::error!(error = %err, "Analysis failed");
                self.error = Some(err.to_string());
                self.state = WorkflowState::Failure;
            }
        }
        Ok(())
    }

    /// Seeds the edit maps with the values shown for each displayed record,
    /// keeping anything the user already entered.
    fn capture_displayed_fields(&mut self, results: &[UpdateRecord]) {
        for record in results {
            self.rationales
                .entry(record.id())
                .or_insert_with(|| record.rationale().to_string());
            self.affected
                .entry(record.id())
                .or_insert_with(|| record.affected_products_text());
        }
    }

    pub fn set_rationale(&mut self, id: u32, text: impl Into<String>) {
        self.rationales.insert(id, text.into());
    }

    pub fn set_affected(&mut self, id: u32, text: impl Into<String>) {
        self.affected.insert(id, text.into());
    }

    /// Renders the annotated result set into the downloadable PDF.
    pub fn download_pdf(&mut self, clock: &dyn Clock) -> WorkflowResult<ReportArtifact> {
        self.ensure_available(Action::DownloadPdf)?;
        let Some(results) = self.results.as_deref() else {
            return Err(WorkflowError::InvalidAction { action: Action::DownloadPdf, state: self.state });
        };

        let started = Instant::now();
        let bytes = generate_report(results, &self.rationales, &self.affected, clock.now());
        let elapsed = started.elapsed().as_secs_f64();
        self.logs.push(format!("PDF rendered in {elapsed:.2} seconds."));
        tracing::info!(bytes = bytes.len(), elapsed_secs = elapsed, "PDF rendered");
        Ok(ReportArtifact::pdf(bytes))
    }

    /// `Complete` → `Idle`, restoring every field to its initial value.
    pub fn reset(&mut self) -> WorkflowResult<()> {
        self.ensure_available(Action::Reset)?;
        *self = Self::default();
        tracing::info!("Session reset");
        Ok(())
    }

    /// `Failure` (or an inconsistent session) → `Idle`, clearing the error.
    pub fn retry(&mut self) -> WorkflowResult<()> {
        self.ensure_available(Action::Retry)?;
        self.state = WorkflowState::Idle;
        self.error = None;
        self.results = None;
        tracing::info!("Retry requested");
        Ok(())
    }
}
