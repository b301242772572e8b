use crate::application::{Action, App, AppMode, EditField};
use crate::infrastructure::FileRepository;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing(_) => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }

        match key {
            KeyCode::Char('r') => {
                if app.session.is_available(Action::Retry) {
                    app.retry();
                } else {
                    app.run_analysis();
                }
            }
            KeyCode::Char('d') => Self::download(app),
            KeyCode::Char('x') => app.reset(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Char('e') => app.start_editing(EditField::Rationale),
            KeyCode::Char('a') => app.start_editing(EditField::AffectedProducts),
            KeyCode::F(1) | KeyCode::Char('?') => app.toggle_help(),
            KeyCode::Esc => app.status_message = None,
            _ => {}
        }
    }

    fn download(app: &mut App) {
        if let Some(artifact) = app.prepare_download() {
            let result = FileRepository::save_report(&artifact, &app.output_dir);
            app.set_download_result(result);
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Backspace => app.delete_backward(),
            KeyCode::Delete => app.delete_forward(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.toggle_help();
        }
    }
}
