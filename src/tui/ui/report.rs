use crate::report::Discrepancy;
use crate::tui::app::AppState;
use ratatui::prelude::*;
use ratatui::widgets::*;

use super::layout::{centered_rect, inner};

pub(super) fn draw_report(f: &mut Frame, app: &AppState) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // summary
            Constraint::Length(3), // pass ratio
            Constraint::Min(5),    // list + detail
            Constraint::Length(3), // status bar
        ])
        .split(size);

    draw_summary(f, app, chunks[0]);

    let ratio = app.report.pass_ratio().clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(Block::default().title("Clean rounds").borders(Borders::ALL))
        .gauge_style(Style::default().fg(if ratio >= 1.0 { Color::Green } else { Color::Yellow }))
        .ratio(ratio)
        .label(format!("{:.2}%", ratio * 100.0));
    f.render_widget(gauge, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    draw_list(f, app, body[0]);
    draw_detail(f, app.selected_discrepancy(), body[1]);

    let filter = app.filter.map_or_else(|| "all".to_string(), |k| k.to_string());
    let status = Paragraph::new(Line::from(format!(
        "filter: {filter}   ↑/↓ move • PgUp/PgDn page • f filter • ? help • q quit"
    )))
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[3]);

    if app.help_open() {
        draw_help(f);
    }
}

fn draw_summary(f: &mut Frame, app: &AppState, area: Rect) {
    let report = &app.report;
    let mut lines = vec![Line::from(format!(
        "rounds: {}   failed: {}   flagged: {}   discrepancies: {}",
        report.rounds_processed,
        report.rounds_failed,
        report.flagged_rounds(),
        report.discrepancies.len()
    ))];
    let counts: Vec<Span> = report
        .counts_by_kind()
        .into_iter()
        .map(|(kind, n)| {
            let style = if app.filter == Some(kind) {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            Span::styled(format!("{kind}: {n}  "), style)
        })
        .collect();
    lines.push(Line::from(counts));
    let block = Block::default().title(format!("table-audit {}", crate::VERSION)).borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_list(f: &mut Frame, app: &AppState, area: Rect) {
    let visible = app.visible();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|d| {
            let seat = d.seat.map_or_else(String::new, |s| format!(" seat {s}"));
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", d.kind.label()), kind_style(d)),
                Span::raw(format!("{}{}", d.round_id, seat)),
            ]))
        })
        .collect();
    let title = format!("Discrepancies ({})", visible.len());
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn kind_style(d: &Discrepancy) -> Style {
    use crate::report::DiscrepancyKind as K;
    let color = match d.kind {
        K::Structural => Color::Red,
        K::Mismatch => Color::Yellow,
        K::DuplicateCard | K::Outcome => Color::Magenta,
        _ => Color::Cyan,
    };
    Style::default().fg(color)
}

fn draw_detail(f: &mut Frame, selected: Option<&Discrepancy>, area: Rect) {
    let block = Block::default().title("Detail").borders(Borders::ALL);
    let Some(d) = selected else {
        let para = Paragraph::new("No discrepancies.").alignment(Alignment::Center).block(block);
        f.render_widget(para, area);
        return;
    };
    let mut lines = vec![
        Line::from(format!("round: {}", d.round_id)),
        Line::from(format!("kind: {}", d.kind)),
    ];
    if let Some(seat) = d.seat {
        lines.push(Line::from(format!("seat: {seat}")));
    }
    if let Some(field) = d.field {
        lines.push(Line::from(format!("field: {}", field.label())));
    }
    if let Some(c) = d.computed {
        lines.push(Line::from(format!("computed: {c}")));
    }
    if let Some(r) = d.recorded {
        lines.push(Line::from(format!("recorded: {r}")));
    }
    if !d.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(d.description.clone()));
    }
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner(area));
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());
    let block = Block::default().title("Help").borders(Borders::ALL);
    let lines = vec![
        Line::from(Span::styled("Navigation:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- Up / Down (k / j): move selection"),
        Line::from("- PgUp / PgDn: move ten rows"),
        Line::from("- Home / End (g / G): first / last"),
        Line::from(""),
        Line::from(Span::styled("Filter:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- F: cycle discrepancy kind"),
        Line::from("- Esc: show all"),
        Line::from(""),
        Line::from("- Q: quit"),
        Line::from("Close help: ? or Esc"),
    ];
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, inner(area));
}
