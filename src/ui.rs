use pomocli::app::App;
use pomocli::queue::{ItemStatus, SessionItem};
use pomocli::timer::{Activity, TimerStatus};
use ratatui::{
    prelude::*,
    widgets::{block::{Position, Title}, *},
};

// ============================================================================
// Colors
// ============================================================================

const SESSION_COLOR: Color = Color::Rgb(100, 181, 246);
const BREAK_COLOR: Color = Color::Rgb(255, 0, 100);
const BORDER_COLOR: Color = Color::Rgb(0, 200, 255);
const ACCENT_COLOR: Color = Color::Rgb(255, 100, 0);

fn activity_color(activity: Activity) -> Color {
    match activity {
        Activity::Session => SESSION_COLOR,
        Activity::Break => BREAK_COLOR,
    }
}

fn bordered<'a>() -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, chunks[0]);
    render_timer(f, app, chunks[1]);
    render_queue(f, app, chunks[2]);
    render_message(f, app, chunks[3]);
    render_prompt(f, app, chunks[4]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let timer = &app.timer;
    let (status, status_color) = match timer.status() {
        TimerStatus::Running => ("▶ RUNNING", Color::Green),
        TimerStatus::Paused => ("⏸ PAUSED", Color::Yellow),
        TimerStatus::Finished if timer.is_resume_pending() => ("⏳ UP NEXT", Color::Cyan),
        TimerStatus::Finished => ("■ STOPPED", Color::DarkGray),
    };
    let project = if app.project_name.is_empty() { "-" } else { app.project_name.as_str() };

    let line = Line::from(vec![
        Span::styled(
            timer.activity().name(),
            Style::default().fg(activity_color(timer.activity())).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw("   project: "),
        Span::styled(project, Style::default().add_modifier(Modifier::ITALIC)),
    ]);

    let title = Span::styled(
        " 🍅 POMOCLI ",
        Style::default().fg(ACCENT_COLOR).add_modifier(Modifier::BOLD),
    );
    f.render_widget(
        Paragraph::new(line).block(bordered().title(title)),
        area,
    );
}

fn render_timer(f: &mut Frame, app: &App, area: Rect) {
    let timer = &app.timer;
    let secs = timer.remaining_secs();
    let color = activity_color(timer.activity());

    let total = match (timer.activity(), app.queue.current()) {
        (Activity::Session, Some(item)) => item.secs_per_repeat(),
        _ => timer.activity_duration(),
    }
    .max(1);
    let ratio = (1.0 - f64::from(secs) / f64::from(total)).clamp(0.0, 1.0);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3)])
        .split(area);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("Time Left  {:02}:{:02}", secs / 60, secs % 60),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        rows[0],
    );
    f.render_widget(
        Gauge::default()
            .block(bordered())
            .gauge_style(Style::default().fg(color))
            .ratio(ratio),
        rows[1],
    );
}

fn queue_line(i: usize, item: &SessionItem) -> ListItem<'_> {
    let status_style = match item.status() {
        ItemStatus::InProgress => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ItemStatus::Pending => Style::default().fg(Color::Gray),
        ItemStatus::Completed => Style::default().fg(Color::DarkGray),
    };
    ListItem::new(Line::from(vec![
        Span::styled(format!("{}. ", i + 1), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("{:<24}", item.name())),
        Span::raw(format!(
            "{}/{} x {} min  ",
            item.completed_repeats(),
            item.total_repeats(),
            item.secs_per_repeat() / 60
        )),
        Span::styled(item.status().label(), status_style),
    ]))
}

fn render_queue(f: &mut Frame, app: &App, area: Rect) {
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut lines: Vec<ListItem> = vec![ListItem::new(Span::styled("Queue:", heading))];

    let open: Vec<_> = app.queue.open_items().collect();
    if open.is_empty() {
        lines.push(ListItem::new("No pending sessions in the queue"));
    }
    lines.extend(open.into_iter().enumerate().map(|(i, item)| queue_line(i, item)));

    lines.push(ListItem::new(""));
    lines.push(ListItem::new(Line::from(vec![
        Span::styled("Completed Sessions: ", heading),
        Span::styled(
            "use command 'completed' to toggle",
            Style::default().add_modifier(Modifier::ITALIC),
        ),
    ])));
    if app.queue.show_completed() {
        let done: Vec<_> = app.queue.completed_items().collect();
        if done.is_empty() {
            lines.push(ListItem::new("No completed sessions"));
        }
        lines.extend(done.into_iter().enumerate().map(|(i, item)| queue_line(i, item)));
    }

    f.render_widget(List::new(lines).block(bordered().title(" Sessions ")), area);
}

fn render_message(f: &mut Frame, app: &App, area: Rect) {
    let text = app.message().map(|m| m.text.as_str()).unwrap_or("");
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("MESSAGE: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(text),
        ]))
        .wrap(Wrap { trim: true })
        .block(bordered()),
        area,
    );
}

fn render_prompt(f: &mut Frame, app: &App, area: Rect) {
    let hint = " start · stop · session [m] · break [m] · reset · add <name> [n] [m] · completed · project <name> · save · load · quit ";
    f.render_widget(
        Paragraph::new(format!("> {}", app.prompt))
            .block(
                bordered()
                    .title(" Commands ")
                    .title(
                        Title::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
                            .position(Position::Bottom),
                    ),
            ),
        area,
    );

    let typed = u16::try_from(app.prompt.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(3).saturating_add(typed);
    if x < area.right().saturating_sub(1) {
        f.set_cursor(x, area.y + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomocli::config::AppConfig;
    use ratatui::backend::TestBackend;

    #[test]
    fn very_long_prompt_still_renders() {
        let mut terminal = Terminal::new(TestBackend::new(60, 24)).unwrap();
        let mut app = App::new(&AppConfig::default());
        app.prompt = "x".repeat(usize::from(u16::MAX) + 10);
        terminal.draw(|f| render(f, &app)).unwrap();
    }
}
