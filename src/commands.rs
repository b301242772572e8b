//! Entry points for the two ways of driving a session: the interactive
//! terminal front end and the headless report.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::application::{AnalysisPipeline, App, AppMode, Clock, Session, SystemClock, WorkflowState};
use crate::config::AppConfig;
use crate::infrastructure::FileRepository;
use crate::presentation::{render_ui, InputHandler};

/// Pipeline over the seed records with the configured stage delay.
pub fn build_pipeline(config: &AppConfig) -> Result<AnalysisPipeline> {
    let pipeline = AnalysisPipeline::seeded().context("Seed update records are invalid")?;
    Ok(pipeline.with_stage_delay(config.stage_delay()))
}

/// Runs the analysis, applies annotations and writes the PDF.
///
/// Returns the path written. Fails if the analysis ends in `Failure`.
pub fn run_report(
    pipeline: &AnalysisPipeline,
    clock: &dyn Clock,
    annotations: Option<&Path>,
    output: &Path,
) -> Result<PathBuf> {
    let mut session = Session::new();
    session.run_analysis()?;
    session.execute_pipeline(pipeline, clock)?;

    if session.state == WorkflowState::Failure {
        let error = session.error.unwrap_or_default();
        bail!("Analysis failed: {error}");
    }

    if let Some(path) = annotations {
        let annotations = FileRepository::load_annotations(path)?;
        tracing::info!(
            rationales = annotations.rationales.len(),
            affected = annotations.affected.len(),
            "Applying annotations"
        );
        for (id, text) in annotations.rationales {
            session.set_rationale(id, text);
        }
        for (id, text) in annotations.affected {
            session.set_affected(id, text);
        }
    }

    let artifact = session.download_pdf(clock)?;
    let path = FileRepository::save_report_as(&artifact, output)?;
    Ok(path)
}

/// Takes over the terminal until the user quits.
pub fn run_tui(pipeline: AnalysisPipeline, output_dir: PathBuf) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(pipeline, Box::new(SystemClock), output_dir);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Terminal front end failed")
}

/// Main event loop. A pending pipeline run is executed right after the
/// `Running` view has been drawn.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if app.execute_pending() {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if app.mode == AppMode::Normal => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
