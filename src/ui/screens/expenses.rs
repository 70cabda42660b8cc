use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::money::format_money;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

const HEADERS: [&str; 6] = [
    "Date",
    "Vendor",
    "Description",
    "Category",
    "Status",
    "Amount",
];

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = table_title(app);

    if app.expenses.is_empty() {
        let hint = if !app.search_input.is_empty() {
            format!(
                "No expenses matching '{}'. Press Esc to clear the search",
                app.search_input
            )
        } else if let Some(month) = app.month_filter {
            format!(
                "No expenses in {}. Press Esc to show all months",
                month.label()
            )
        } else {
            "No expenses yet. Add one with :add <amount> <vendor> or :import <file.csv>".into()
        };
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ])
        .centered()
        .block(bordered(title));
        f.render_widget(msg, area);
        return;
    }

    let header_cells = HEADERS
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, e)| {
            let style = if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(e.created_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(truncate(&e.vendor, 24)),
                Cell::from(truncate(&e.description, 40)),
                Cell::from(e.category.title()),
                Cell::from(Span::styled(
                    e.status.as_str(),
                    Style::default().fg(theme::status_color(e.status)),
                )),
                Cell::from(
                    Line::from(format_money(e.amount, &app.currency_symbol)).right_aligned(),
                ),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(17),
        Constraint::Length(24),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(title));
    f.render_widget(table, area);
}

fn table_title(app: &App) -> String {
    let total: Decimal = app.expenses.iter().map(|e| e.amount).sum();
    let mut title = format!(
        " Expenses ({}) {} ",
        app.expenses.len(),
        format_money(total, &app.currency_symbol)
    );
    if let Some(month) = app.month_filter {
        title.push_str(&format!("month: {} ", month.label()));
    }
    if !app.search_input.is_empty() {
        title.push_str(&format!("search: '{}' ", app.search_input));
    }
    title
}

fn bordered(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(title, theme::title_style()))
}
