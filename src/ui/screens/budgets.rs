use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::engine::{BudgetHealth, MonthWindow};
use crate::money::format_money;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::progress_bar;

const BAR_WIDTH: usize = 20;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let month = MonthWindow::containing(app.now).label();
    let Some(health) = app.health.as_ref().filter(|h| !h.categories.is_empty()) else {
        render_empty(f, area, &month);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_summary(f, chunks[0], app, health);

    let symbol = app.currency_symbol.as_str();
    let items: Vec<ListItem> = health
        .categories
        .iter()
        .enumerate()
        .skip(app.budget_scroll)
        .take(chunks[1].height.saturating_sub(2) as usize)
        .map(|(i, row)| {
            let color = theme::health_color(row.status);
            let ratio = (row.percentage / Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0);

            let style = if i == app.budget_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let remaining = if row.is_over_budget {
                format!("{} over", format_money(-row.remaining, symbol))
            } else {
                format!("{} left", format_money(row.remaining, symbol))
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<12}", row.category.title()), style),
                Span::styled(
                    format!(
                        "{:>11} / {:<11} ",
                        format_money(row.spent, symbol),
                        format_money(row.limit, symbol)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(progress_bar(ratio, BAR_WIDTH), Style::default().fg(color)),
                Span::styled(
                    format!(" {:>6.1}% ", row.percentage),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<8}", row.status.as_str()),
                    Style::default().fg(color),
                ),
                Span::styled(remaining, theme::dim_style()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Budget Health for {month} "),
                theme::title_style(),
            )),
    );
    f.render_widget(list, chunks[1]);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App, health: &BudgetHealth) {
    let s = &health.summary;
    let symbol = app.currency_symbol.as_str();
    let overall_color = if s.over_budget_categories > 0 {
        theme::RED
    } else if s.warning_categories > 0 {
        theme::YELLOW
    } else {
        theme::GREEN
    };

    let line = Line::from(vec![
        Span::styled(
            format!(
                " {} of {} spent ",
                format_money(s.total_spent, symbol),
                format_money(s.total_budget, symbol)
            ),
            theme::normal_style(),
        ),
        Span::styled(
            format!("({:.1}%)", s.overall_health),
            Style::default()
                .fg(overall_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", theme::normal_style()),
        Span::styled(
            format!("{} good", s.healthy_categories),
            Style::default().fg(theme::GREEN),
        ),
        Span::styled(" · ", theme::dim_style()),
        Span::styled(
            format!("{} warning", s.warning_categories),
            Style::default().fg(theme::YELLOW),
        ),
        Span::styled(" · ", theme::dim_style()),
        Span::styled(
            format!("{} over", s.over_budget_categories),
            Style::default().fg(theme::RED),
        ),
    ]);

    let summary = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Summary ", theme::title_style())),
    );
    f.render_widget(summary, area);
}

fn render_empty(f: &mut Frame, area: Rect, month: &str) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("No budgets set for {month}"),
            theme::dim_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Use :budget <category> <limit> to set a monthly spending limit",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Budgets ", theme::title_style())),
    );
    f.render_widget(msg, area);
}
