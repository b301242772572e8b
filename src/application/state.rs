//! Application state for the terminal front end.
//!
//! [`App`] wraps the workflow [`Session`] with the UI-only state needed to
//! draw it: record selection, the field being edited and a transient status
//! line.

use std::path::PathBuf;

use super::pipeline::{AnalysisPipeline, Clock, SystemClock};
use super::session::{Session, View};
use crate::domain::{group_by_impact, DomainResult, ReportArtifact, UpdateRecord};
use crate::infrastructure::StorageError;

/// Which per-record text field is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Rationale,
    AffectedProducts,
}

impl EditField {
    pub fn label(self) -> &'static str {
        match self {
            EditField::Rationale => "Rationale",
            EditField::AffectedProducts => "Affected Products/Operations",
        }
    }
}

/// Determines how key presses are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Workflow controls and record navigation
    Normal,
    /// Typing into one field of the selected record
    Editing(EditField),
    /// Key reference popup is displayed
    Help,
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use regintel::application::{App, AppMode, WorkflowState};
///
/// let app = App::default();
/// assert_eq!(app.session.state, WorkflowState::Idle);
/// assert_eq!(app.mode, AppMode::Normal);
/// ```
#[derive(Debug)]
pub struct App {
    /// Workflow session shown by every view
    pub session: Session,
    /// Pipeline executed when the session enters `Running`
    pub pipeline: AnalysisPipeline,
    /// Time source for log lines and report headers
    pub clock: Box<dyn Clock>,
    /// Directory the downloaded report is written to
    pub output_dir: PathBuf,
    /// Current input mode
    pub mode: AppMode,
    /// Index of the selected record in display order
    pub selected: usize,
    /// Input buffer while editing
    pub input: String,
    /// Cursor position in characters within `input`
    pub cursor_position: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        let pipeline = pipeline_or_empty(AnalysisPipeline::seeded());
        Self::new(pipeline, Box::new(SystemClock), PathBuf::from("."))
    }
}

/// Falls back to an empty result set when the seed records fail validation.
fn pipeline_or_empty(seeded: DomainResult<AnalysisPipeline>) -> AnalysisPipeline {
    seeded.unwrap_or_else(|err| {
        tracing::error!(error = %err, "Seed update records are invalid; analysis will return no records");
        AnalysisPipeline::new(Vec::new())
    })
}

impl App {
    pub fn new(pipeline: AnalysisPipeline, clock: Box<dyn Clock>, output_dir: PathBuf) -> Self {
        Self {
            session: Session::new(),
            pipeline,
            clock,
            output_dir,
            mode: AppMode::Normal,
            selected: 0,
            input: String::new(),
            cursor_position: 0,
            status_message: None,
        }
    }

    /// Records in the order the complete view lists them: by impact section,
    /// input order within a section.
    pub fn displayed_records(&self) -> Vec<&UpdateRecord> {
        match (self.session.view(), self.session.results.as_deref()) {
            (View::Complete, Some(results)) => group_by_impact(results).ordered(),
            _ => Vec::new(),
        }
    }

    pub fn selected_record(&self) -> Option<&UpdateRecord> {
        self.displayed_records().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let count = self.displayed_records().len();
        if self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Current text of a field for a record: the edit map value or the default.
    pub fn field_value(&self, record: &UpdateRecord, field: EditField) -> String {
        match field {
            EditField::Rationale => record.resolve_rationale(&self.session.rationales).to_string(),
            EditField::AffectedProducts => record.resolve_affected(&self.session.affected),
        }
    }

    /// Switches to editing mode for a field of the selected record.
    pub fn start_editing(&mut self, field: EditField) {
        let Some(value) = self.selected_record().map(|r| self.field_value(r, field)) else {
            return;
        };
        self.mode = AppMode::Editing(field);
        self.input = value;
        self.cursor_position = self.input.chars().count();
        self.status_message = None;
    }

    /// Stores the input buffer in the matching edit map.
    pub fn finish_editing(&mut self) {
        let AppMode::Editing(field) = self.mode else {
            return;
        };
        if let Some(id) = self.selected_record().map(UpdateRecord::id) {
            let text = std::mem::take(&mut self.input);
            match field {
                EditField::Rationale => self.session.set_rationale(id, text),
                EditField::AffectedProducts => self.session.set_affected(id, text),
            }
            tracing::debug!(id, field = field.label(), "Field updated");
        }
        self.cancel_editing();
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Help => AppMode::Normal,
            _ => AppMode::Help,
        };
    }

    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.input.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn delete_backward(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.input.remove(at);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            let at = self.byte_index(self.cursor_position);
            self.input.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    pub fn run_analysis(&mut self) {
        self.status_message = self.session.run_analysis().err().map(|e| e.to_string());
    }

    /// Executes the pipeline if the session is waiting in `Running`.
    ///
    /// Returns whether anything ran, so the caller knows to redraw.
    pub fn execute_pending(&mut self) -> bool {
        if self.session.view() != View::Running {
            return false;
        }
        if let Err(err) = self.session.execute_pipeline(&self.pipeline, self.clock.as_ref()) {
            self.status_message = Some(err.to_string());
        }
        self.selected = 0;
        true
    }

    /// Renders the report; the caller persists it and reports back through
    /// [`App::set_download_result`].
    pub fn prepare_download(&mut self) -> Option<ReportArtifact> {
        match self.session.download_pdf(self.clock.as_ref()) {
            Ok(artifact) => Some(artifact),
            Err(err) => {
                self.status_message = Some(err.to_string());
                None
            }
        }
    }

    pub fn set_download_result(&mut self, result: Result<PathBuf, StorageError>) {
        self.status_message = Some(match result {
            Ok(path) => format!("Saved {}", path.display()),
            Err(err) => {
                tracing::error!(error = %err, "Report download failed");
                format!("Download failed: {err}")
            }
        });
    }

    pub fn reset(&mut self) {
        match self.session.reset() {
            Ok(()) => {
                self.selected = 0;
                self.status_message = None;
            }
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }

    pub fn retry(&mut self) {
        match self.session.retry() {
            Ok(()) => self.status_message = None,
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::tests::{fixed_clock, instant_pipeline};
    use crate::application::WorkflowState;
    use crate::domain::ImpactLevel;

    fn test_app() -> App {
        App::new(instant_pipeline(), Box::new(fixed_clock()), PathBuf::from("."))
    }

    fn completed_app() -> App {
        let mut app = test_app();
        app.run_analysis();
        assert!(app.execute_pending());
        app
    }

    #[test]
    fn test_app_default() {
        let app = App::default();
        assert_eq!(app.session.state, WorkflowState::Idle);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.selected, 0);
        assert!(app.input.is_empty());
        assert_eq!(app.cursor_position, 0);
        assert!(app.status_message.is_none());
        assert_eq!(app.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_invalid_seed_yields_empty_pipeline() {
        let pipeline = pipeline_or_empty(Err(crate::domain::DomainError::DuplicateId(1)))
            .with_stage_delay(std::time::Duration::ZERO);
        let mut log = Vec::new();
        let results = pipeline.run(&fixed_clock(), &mut log).unwrap();
        assert!(results.is_empty());
        assert_eq!(pipeline_or_empty(Ok(instant_pipeline())).stage_delay(), std::time::Duration::ZERO);
    }

    #[test]
    fn test_run_then_execute_pending() {
        let mut app = test_app();
        assert!(!app.execute_pending());
        app.run_analysis();
        assert_eq!(app.session.state, WorkflowState::Running);
        assert!(app.execute_pending());
        assert_eq!(app.session.state, WorkflowState::Complete);
        assert!(!app.execute_pending());
    }

    #[test]
    fn test_invalid_action_sets_status() {
        let mut app = test_app();
        app.reset();
        assert_eq!(
            app.status_message.as_deref(),
            Some("Reset is not available while the workflow is Idle")
        );
        assert_eq!(app.session.state, WorkflowState::Idle);
    }

    #[test]
    fn test_displayed_records_follow_section_order() {
        let app = completed_app();
        let levels: Vec<ImpactLevel> = app.displayed_records().iter().map(|r| r.impact_level()).collect();
        assert_eq!(levels, vec![ImpactLevel::Critical, ImpactLevel::High, ImpactLevel::Low]);
        assert!(test_app().displayed_records().is_empty());
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = completed_app();
        app.select_previous();
        assert_eq!(app.selected, 0);
        for _ in 0..5 {
            app.select_next();
        }
        assert_eq!(app.selected, 2);
        assert_eq!(app.selected_record().map(UpdateRecord::id), Some(3));
    }

    #[test]
    fn test_start_editing_loads_current_value() {
        let mut app = completed_app();
        app.select_next();
        app.start_editing(EditField::AffectedProducts);
        assert_eq!(app.mode, AppMode::Editing(EditField::AffectedProducts));
        assert_eq!(app.input, "Guardant Reveal");
        assert_eq!(app.cursor_position, 15);
    }

    #[test]
    fn test_start_editing_requires_records() {
        let mut app = test_app();
        app.start_editing(EditField::Rationale);
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_finish_editing_updates_edit_map() {
        let mut app = completed_app();
        app.start_editing(EditField::AffectedProducts);
        app.input = "Shield".to_string();
        app.finish_editing();

        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.input.is_empty());
        assert_eq!(app.session.affected.get(&1).map(String::as_str), Some("Shield"));
        assert_eq!(app.session.affected.get(&2).map(String::as_str), Some("Guardant Reveal"));
    }

    #[test]
    fn test_cancel_editing_keeps_edit_map() {
        let mut app = completed_app();
        app.start_editing(EditField::Rationale);
        app.insert_char('!');
        app.cancel_editing();
        assert_eq!(
            app.session.rationales.get(&1).map(String::as_str),
            Some("Immediate compliance required for NGS-based tests.")
        );
    }

    #[test]
    fn test_cursor_editing_handles_multibyte_text() {
        let mut app = completed_app();
        app.start_editing(EditField::Rationale);
        app.input = "caf".to_string();
        app.move_cursor_end();
        app.insert_char('é');
        app.insert_char('!');
        assert_eq!(app.input, "café!");
        app.move_cursor_left();
        app.delete_backward();
        assert_eq!(app.input, "caf!");
        app.move_cursor_home();
        app.delete_forward();
        assert_eq!(app.input, "af!");
        app.move_cursor_right();
        assert_eq!(app.cursor_position, 1);
    }

    #[test]
    fn test_prepare_download_outside_complete() {
        let mut app = test_app();
        assert!(app.prepare_download().is_none());
        assert!(app.status_message.as_deref().unwrap().starts_with("Download PDF is not available"));
    }

    #[test]
    fn test_set_download_result() {
        let mut app = completed_app();
        app.set_download_result(Ok(PathBuf::from("out/guardant_regulatory_report.pdf")));
        assert_eq!(app.status_message.as_deref(), Some("Saved out/guardant_regulatory_report.pdf"));
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut app = completed_app();
        app.select_next();
        app.reset();
        assert_eq!(app.selected, 0);
        assert_eq!(app.session, Session::new());
    }
}
