use crate::application::{Action, App, AppMode, EditField, View};
use crate::domain::{group_by_impact, ImpactLevel, UpdateRecord, ACTION_STEPS, COUNTRIES, CROSS_REFERENCE_TEXT, PRODUCTS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub const APP_TITLE: &str = "Guardant Health Regulatory Intelligence - MVP";
pub const COUNTRY_VISUAL_NOTICE: &str =
    "Country list image not found. Add the country list visual to display it here.";

/// Draws the whole screen from the current snapshot.
pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_scope(f, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[2]);

    match app.session.view() {
        View::Idle => render_idle(f, body[0]),
        View::Running => render_running(f, body[0]),
        View::Complete => render_complete(f, app, body[0]),
        View::Failure => render_failure(f, app, body[0]),
        View::Fallback => render_fallback(f, body[0]),
    }
    render_logs(f, app, body[1]);
    render_status_bar(f, app, chunks[3]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn impact_color(level: ImpactLevel) -> Color {
    match level {
        ImpactLevel::Critical => Color::Rgb(231, 76, 60),
        ImpactLevel::High => Color::Rgb(243, 156, 18),
        ImpactLevel::Medium => Color::Rgb(52, 152, 219),
        ImpactLevel::Low => Color::Rgb(149, 165, 166),
    }
}

/// Key bound to a workflow control.
pub fn action_key(action: Action) -> char {
    match action {
        Action::RunAnalysis | Action::Retry => 'r',
        Action::DownloadPdf => 'd',
        Action::Reset => 'x',
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!("{} | State: {}", APP_TITLE, app.session.state))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_scope(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(vec![Span::styled("Countries: ", bold()), Span::raw(COUNTRIES.join(", "))]),
        Line::from(vec![Span::styled("Products: ", bold()), Span::raw(PRODUCTS.join(", "))]),
    ];
    let scope = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Scope"))
        .wrap(Wrap { trim: true });
    f.render_widget(scope, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::raw(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled(action_key(Action::RunAnalysis).to_string(), bold().fg(Color::Green)),
            Span::raw(" to "),
            Span::styled(Action::RunAnalysis.to_string(), bold()),
            Span::raw("."),
        ]),
    ];
    let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Analysis"));
    f.render_widget(widget, area);
}

fn render_running(f: &mut Frame, area: Rect) {
    let widget = Paragraph::new(vec![Line::raw(""), Line::styled("Running analysis...", bold().fg(Color::Yellow))])
        .block(Block::default().borders(Borders::ALL).title("Analysis"));
    f.render_widget(widget, area);
}

fn render_failure(f: &mut Frame, app: &App, area: Rect) {
    let mut text = vec![Line::styled("An error occurred during analysis.", bold().fg(Color::Red))];
    if let Some(error) = &app.session.error {
        text.push(Line::from(vec![Span::styled("Error details: ", bold()), Span::raw(error.clone())]));
    }
    text.push(Line::raw(""));
    text.push(Line::raw(format!("Press {} to {}.", action_key(Action::Retry), Action::Retry)));
    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Failure"))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_fallback(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::styled("An error occurred. Please try again.", bold().fg(Color::Red)),
        Line::raw(""),
        Line::raw(format!("Press {} to {}.", action_key(Action::Retry), Action::Retry)),
    ];
    let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Error"));
    f.render_widget(widget, area);
}

fn render_complete(f: &mut Frame, app: &App, area: Rect) {
    let Some(results) = app.session.results.as_deref() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let buckets = group_by_impact(results);

    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[0]);
    for (i, (level, count)) in buckets.counts().into_iter().enumerate() {
        let tile = Paragraph::new(vec![
            Line::styled(level.as_str(), bold()),
            Line::raw(format!("{count} update(s)")),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().bg(impact_color(level)).fg(Color::White));
        f.render_widget(tile, tiles[i]);
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;
    let mut index = 0;
    for (level, section) in buckets.iter() {
        if section.is_empty() {
            continue;
        }
        lines.push(Line::styled(
            format!("{} Priority ({})", level, section.len()),
            bold().fg(impact_color(level)),
        ));
        for record in section {
            let selected = index == app.selected;
            if selected {
                selected_line = lines.len();
            }
            push_card(&mut lines, app, record, selected);
            index += 1;
        }
    }

    let visible = chunks[1].height.saturating_sub(2) as usize;
    let scroll = selected_line.saturating_sub(visible / 4);
    let results_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Results"))
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(results_widget, chunks[1]);

    let notice = Paragraph::new(COUNTRY_VISUAL_NOTICE)
        .style(Style::default().fg(Color::Blue))
        .block(Block::default().borders(Borders::ALL).title("Country List Visual"));
    f.render_widget(notice, chunks[2]);
}

fn labelled<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![Span::styled(label, bold()), Span::raw(value)])
}

fn push_card(lines: &mut Vec<Line<'_>>, app: &App, record: &UpdateRecord, selected: bool) {
    let marker = if selected { "> " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(record.applicability_banner(), bold()),
    ]));
    lines.push(labelled("Country & Regulation", format!(": {}", record.header_line())));
    lines.push(labelled("Change Summary", format!(": {}", record.summary())));
    lines.push(Line::styled("Key Changes:", bold()));
    for change in record.key_changes() {
        lines.push(Line::raw(format!("- {change}")));
    }
    lines.push(Line::styled("Guardant Health Impact Assessment:", bold()));
    lines.push(Line::from(vec![
        Span::raw("- "),
        Span::styled("Impact Level", bold()),
        Span::raw(format!(": {}", record.impact_level())),
    ]));
    for field in [EditField::Rationale, EditField::AffectedProducts] {
        lines.push(field_line(app, record, field, selected));
    }
    lines.push(Line::styled("Action Required:", bold()));
    for step in ACTION_STEPS {
        lines.push(Line::raw(step));
    }
    lines.push(Line::styled("Timeline:", bold()));
    lines.push(Line::raw(format!("- Effective Date: {}", record.effective_date_text())));
    lines.push(Line::raw(format!("- Compliance Deadline: {}", record.compliance_deadline_text())));
    lines.push(Line::raw(format!("- Transition Period: {}", record.transition_period())));
    lines.push(labelled("Related Standards or Regulations", format!(": {}", record.harmonization().join(", "))));
    lines.push(Line::from(vec![
        Span::styled("Cross-Reference:", bold()),
        Span::raw(format!(" {CROSS_REFERENCE_TEXT}")),
    ]));
    lines.push(Line::raw(""));
}

fn field_line<'a>(app: &App, record: &UpdateRecord, field: EditField, selected: bool) -> Line<'a> {
    let editing = selected && app.mode == AppMode::Editing(field);
    let value = if editing { app.input.clone() } else { app.field_value(record, field) };
    let style = if editing {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else if selected {
        Style::default().fg(Color::White).bg(Color::Blue)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(format!("{} for update {}: ", field.label(), record.id()), bold()),
        Span::styled(format!("[{value}]"), style),
    ])
}

fn render_logs(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .session
        .logs
        .iter()
        .map(|log| Line::raw(format!("- {log}")))
        .collect();
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible);
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("App Logs"))
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(widget, area);
}

fn controls_text(app: &App) -> String {
    let mut parts: Vec<String> = app
        .session
        .available_actions()
        .iter()
        .map(|action| format!("{}: {}", action_key(*action), action))
        .collect();
    if app.session.view() == View::Complete {
        parts.insert(0, "j/k: select | e: edit rationale | a: edit affected".to_string());
    }
    parts.push("?: help".to_string());
    parts.push("q: quit".to_string());
    parts.join(" | ")
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match app.mode {
        AppMode::Editing(field) => {
            let id = app.selected_record().map(UpdateRecord::id).unwrap_or_default();
            let prefix = format!("{} for update {}: ", field.label(), id);
            let cursor_x = area.x + 1 + (prefix.chars().count() + app.cursor_position) as u16;
            f.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
            (
                format!("{prefix}{} (Enter to save, Esc to cancel)", app.input),
                Style::default().fg(Color::Green),
            )
        }
        AppMode::Help => ("Esc/?/q: close help".to_string(), Style::default().fg(Color::Cyan)),
        AppMode::Normal => match &app.status_message {
            Some(status) => (status.clone(), Style::default().fg(Color::Yellow)),
            None => (controls_text(app), Style::default()),
        },
    };

    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(widget, area);
}

fn render_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(HELP_TEXT)
        .block(Block::default().borders(Borders::ALL).title("Keys").style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });
    f.render_widget(help, popup_area);
}

const HELP_TEXT: &str = r#"WORKFLOW
r               Run Analysis (Idle) / Retry (after a failure)
d               Download PDF (writes guardant_regulatory_report.pdf)
x               Reset the session (clears results, edits and logs)

RESULTS
j/k or Up/Down  Select an update
e               Edit the rationale of the selected update
a               Edit the affected products of the selected update

EDITING
Enter           Save the field
Esc             Discard changes
Left/Right      Move the cursor
Home/End        Jump to start/end

?/F1            Toggle this help
q               Quit"#;
