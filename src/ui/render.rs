use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    render_screen(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let screens = Screen::all();
    let selected = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
    let titles = screens
        .iter()
        .enumerate()
        .map(|(i, s)| Line::from(format!("{}:{s}", i + 1)));

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(theme::dim_style().bg(theme::HEADER_BG))
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled("|", Style::default().fg(theme::OVERLAY)));

    f.render_widget(tabs, area);
}

fn render_screen(f: &mut Frame, area: Rect, app: &App) {
    match app.screen {
        Screen::Dashboard => super::screens::dashboard::render(f, area, app),
        Screen::Expenses => super::screens::expenses::render(f, area, app),
        Screen::Budgets => super::screens::budgets::render(f, area, app),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode = Span::styled(
        format!(" {} ", app.input_mode),
        Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::mode_color(app.input_mode))
            .add_modifier(Modifier::BOLD),
    );

    let info = Span::styled(
        format!(
            " {} · as of {} · {} expenses",
            app.screen,
            app.now.format("%Y-%m-%d %H:%M"),
            app.expense_count
        ),
        theme::status_bar_style(),
    );

    let keys = match app.screen {
        Screen::Dashboard => "r refresh  :add  ? help ",
        Screen::Expenses => "a approve  x reject  D delete  / search  ? help ",
        Screen::Budgets => ":budget  D delete  ? help ",
    };

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(keys.len() as u16)])
        .split(area);

    f.render_widget(
        Paragraph::new(Line::from(vec![mode, info])).style(theme::status_bar_style()),
        halves[0],
    );
    f.render_widget(
        Paragraph::new(keys)
            .style(theme::status_bar_style())
            .right_aligned(),
        halves[1],
    );
}

/// Prompt followed by the text being typed, with the cursor after the text.
fn prompt_line<'a>(prompt: &'static str, color: Color, text: &'a str) -> (Line<'a>, Option<u16>) {
    let offset = (prompt.chars().count() + text.chars().count()) as u16;
    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(color)),
        Span::styled(text, theme::command_bar_style()),
    ]);
    (line, Some(offset))
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor) = match app.input_mode {
        InputMode::Command => prompt_line(":", theme::ACCENT, &app.command_input),
        InputMode::Editing => prompt_line("description> ", theme::GREEN, &app.command_input),
        InputMode::Search => {
            let (mut line, cursor) = prompt_line("/", theme::YELLOW, &app.search_input);
            if !app.search_input.is_empty() {
                line.push_span(Span::styled(
                    format!("  {} found", app.expenses.len()),
                    theme::dim_style(),
                ));
            }
            (line, cursor)
        }
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" (y/n)", theme::dim_style()),
            ]),
            None,
        ),
        InputMode::Normal if app.status_message.is_empty() => (
            Line::from(Span::styled(
                " : command   / search   ? help   Ctrl-q quit",
                theme::dim_style(),
            )),
            None,
        ),
        InputMode::Normal => (Line::from(app.status_message.as_str()), None),
    };

    f.render_widget(
        Paragraph::new(content).style(theme::command_bar_style()),
        area,
    );

    if let Some(offset) = cursor {
        f.set_cursor_position((area.x + offset.min(area.width.saturating_sub(1)), area.y));
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let row = |text: &'static str| Line::from(Span::styled(text, theme::normal_style()));
    let row_owned = |text: String| Line::from(Span::styled(text, theme::normal_style()));

    let mut help_text = vec![
        Line::from(Span::styled(
            " ExpenseSink Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section(" Navigation"),
        row("  j/k or Up/Down   Move cursor           1-3        Switch screens"),
        row("  Tab/Shift-Tab    Cycle screens         g/G        Top/Bottom"),
        row("  Ctrl-d/u         Half page down/up     Ctrl-q     Quit"),
        Line::from(""),
        section(" Actions"),
        row("  :                Command mode          /          Search (live)"),
        row("  a / x (Expenses) Approve / Reject      D          Delete selected"),
        row("  r                Refresh reports       Esc        Clear filter"),
        Line::from(""),
        section(" Commands"),
    ];

    let mut listed: Vec<(&str, &str)> = commands::COMMANDS
        .iter()
        .filter(|(name, _)| name.len() > 1)
        .map(|(&name, cmd)| (name, cmd.description))
        .collect();
    listed.sort_unstable();
    help_text.extend(
        listed
            .into_iter()
            .map(|(name, desc)| row_owned(format!("  :{name:<15} {desc}"))),
    );

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        theme::dim_style(),
    )));

    let popup_area = centered(area, 72, help_text.len() as u16 + 2);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}
