use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph, Sparkline, Wrap},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::engine::MonthWindow;
use crate::money::{format_money, round_money};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Safe-to-spend cards
            Constraint::Min(8),    // Category chart + alerts
            Constraint::Length(4), // Monthly trend sparkline
        ])
        .split(area);

    render_cards(f, chunks[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_category_chart(f, middle[0], app);
    render_alerts(f, middle[1], app);

    render_trend_sparkline(f, chunks[2], app);
}

fn block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}

fn render_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    let symbol = app.currency_symbol.as_str();

    if let Some(sts) = &app.safe_to_spend {
        let color = theme::recommendation_color(sts.recommendation);
        let days = sts.days_left_in_month;
        let plural = if days == 1 { "" } else { "s" };
        render_card(
            f,
            cards[0],
            "Safe to Spend Today",
            format_money(sts.daily_safe_amount, symbol),
            color,
            format!("{} · {days} day{plural} left", sts.recommendation),
        );
        render_card(
            f,
            cards[1],
            "Discretionary Left",
            format_money(sts.discretionary_remaining, symbol),
            color,
            "meals, marketing, other".into(),
        );
        render_card(
            f,
            cards[2],
            "Budget Remaining",
            format_money(sts.total_remaining, symbol),
            if sts.total_remaining > Decimal::ZERO {
                theme::GREEN
            } else {
                theme::RED
            },
            format!("of {}", format_money(sts.total_budget, symbol)),
        );
    }

    if let Some(overview) = &app.overview {
        let totals = &overview.totals;
        let change = round_money(totals.month_change_percent);
        let sign = if change > Decimal::ZERO { "+" } else { "" };
        render_card(
            f,
            cards[3],
            &format!("Spent in {}", MonthWindow::containing(app.now).label()),
            format_money(totals.this_month_total, symbol),
            if change > Decimal::ZERO {
                theme::RED
            } else {
                theme::GREEN
            },
            format!("{sign}{change}% vs last month"),
        );
    }
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    display: String,
    color: Color,
    subtitle: String,
) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            display,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(block(title));

    f.render_widget(text, area);
}

fn render_category_chart(f: &mut Frame, area: Rect, app: &App) {
    let top = app
        .overview
        .as_ref()
        .map_or(&[][..], |o| o.top_categories.as_slice());

    if top.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No expenses this month. Add one with :add <amount> <vendor>",
            theme::dim_style(),
        )))
        .centered()
        .block(block("Top Categories This Month"));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = top
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.total.round().to_u64().unwrap_or(0))
                .label(Line::from(truncate(&c.category.title(), 10)))
                .text_value(format_money(c.total.round(), &app.currency_symbol).replace(".00", ""))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(block("Top Categories This Month"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT));

    f.render_widget(chart, area);
}

fn render_alerts(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Alerts ({})", app.alerts.len());
    if app.alerts.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Nothing needs attention", theme::dim_style())),
        ])
        .centered()
        .block(block(&title));
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .alerts
        .iter()
        .map(|alert| {
            let color = theme::priority_color(alert.priority);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(color)),
                    Span::styled(
                        alert.title.as_str(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", alert.priority.as_str()), theme::dim_style()),
                ]),
                Line::from(Span::styled(
                    format!("  {}", alert.message),
                    theme::normal_style(),
                )),
            ])
        })
        .collect();

    f.render_widget(List::new(items).block(block(&title)), area);
}

fn render_trend_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let monthly = match &app.trends {
        Some(t) => t.monthly.as_slice(),
        None => &[],
    };
    let data: Vec<u64> = monthly
        .iter()
        .map(|m| m.total.round().to_u64().unwrap_or(0))
        .collect();

    let title = match (monthly.first(), monthly.last()) {
        (Some(first), Some(last)) => {
            format!("Monthly Spending {} → {}", first.label(), last.label())
        }
        _ => "Monthly Spending".into(),
    };

    if data.is_empty() {
        let msg = Paragraph::new(Span::styled("No spending history yet", theme::dim_style()))
            .wrap(Wrap { trim: true })
            .block(block(&title));
        f.render_widget(msg, area);
        return;
    }

    let sparkline = Sparkline::default()
        .block(block(&title))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
