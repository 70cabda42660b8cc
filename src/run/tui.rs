use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;
use crate::db::Database;
use crate::models::{ExpenseStatus, MAX_DESCRIPTION_LEN};
use crate::ui::app::{App, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

use super::now_utc;

pub(crate) fn as_tui(db: &mut Database, config: &Config) -> Result<()> {
    let mut app = App::new(&config.currency_symbol, now_utc());
    app.refresh_all(db)?;
    tracing::info!(expenses = app.expense_count, "starting TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "TUI exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            let handled = match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db),
                InputMode::Command => handle_command_input(key, app, db),
                InputMode::Search => handle_search_input(key, app, db),
                InputMode::Editing => handle_editing_input(key, app, db),
                InputMode::Confirm => handle_confirm_input(key, app, db),
            };
            // A failed action is shown in the status bar; the session continues.
            if let Err(e) = handled {
                tracing::error!(error = %e, "command failed");
                app.input_mode = InputMode::Normal;
                app.set_status(format!("Error: {e}"));
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.page() / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.page() / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('1') => switch_screen(app, db, Screen::Dashboard)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Expenses)?,
        KeyCode::Char('3') => switch_screen(app, db, Screen::Budgets)?,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            switch_screen(app, db, screens[(idx + 1) % screens.len()])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            switch_screen(app, db, screens[(idx + screens.len() - 1) % screens.len()])?;
        }
        KeyCode::Esc => handle_escape(app, db)?,
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('r') => {
            app.reload(db, now_utc())?;
            app.set_status("Reports refreshed");
        }
        KeyCode::Char('a') if app.screen == Screen::Expenses => {
            commands::set_selected_status(app, db, ExpenseStatus::Approved)?;
        }
        KeyCode::Char('x') if app.screen == Screen::Expenses => {
            commands::set_selected_status(app, db, ExpenseStatus::Rejected)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Expenses => {
            commands::request_delete_expense(app);
        }
        KeyCode::Char('D') if app.screen == Screen::Budgets => {
            commands::request_delete_budget(app, None);
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

/// Live search: every keystroke re-filters the Expenses screen.
fn handle_search_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.screen = Screen::Expenses;
            app.refresh_expenses(db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.refresh_expenses(db)?;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            restart_search(app, db)?;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            restart_search(app, db)?;
        }
        _ => {}
    }
    Ok(())
}

fn restart_search(app: &mut App, db: &mut Database) -> Result<()> {
    app.screen = Screen::Expenses;
    app.expense_index = 0;
    app.expense_scroll = 0;
    app.refresh_expenses(db)
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let text = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            if let Some(id) = app.selected_expense().and_then(|e| e.id) {
                commands::update_description(app, db, id, &text)?;
            }
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) if app.command_input.chars().count() < MAX_DESCRIPTION_LEN => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            if let Some(action) = app.pending_action.take() {
                commands::apply_pending(action, app, db)?;
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Dashboard => app.refresh_dashboard(db)?,
        Screen::Expenses => app.refresh_expenses(db)?,
        Screen::Budgets => app.refresh_budgets(db)?,
    }
    app.set_status(format!("{screen}"));
    Ok(())
}

fn handle_escape(app: &mut App, db: &mut Database) -> Result<()> {
    match app.screen {
        Screen::Expenses if !app.search_input.is_empty() => {
            app.search_input.clear();
            app.refresh_expenses(db)?;
            app.set_status("Search cleared");
        }
        Screen::Expenses if app.month_filter.is_some() => {
            app.month_filter = None;
            app.refresh_expenses(db)?;
            app.set_status("Month filter cleared");
        }
        _ => app.status_message.clear(),
    }
    Ok(())
}

fn handle_move_down(app: &mut App) {
    let page = app.page();
    match app.screen {
        Screen::Expenses => scroll_down(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Budgets => {
            let len = app.budget_rows().len();
            scroll_down(&mut app.budget_index, &mut app.budget_scroll, len, page);
        }
        Screen::Dashboard => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_up(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Budgets => scroll_up(&mut app.budget_index, &mut app.budget_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Expenses => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Budgets => scroll_to_top(&mut app.budget_index, &mut app.budget_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.page();
    match app.screen {
        Screen::Expenses => scroll_to_bottom(
            &mut app.expense_index,
            &mut app.expense_scroll,
            app.expenses.len(),
            page,
        ),
        Screen::Budgets => {
            let len = app.budget_rows().len();
            scroll_to_bottom(&mut app.budget_index, &mut app.budget_scroll, len, page);
        }
        Screen::Dashboard => {}
    }
}
