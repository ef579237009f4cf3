use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span, Text};
use tui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::compare::{self, Comparison, Header, Mark};
use crate::state::app_state::{PlayerFocus, TeamFocus};
use crate::state::messages::Side;
use crate::state::modal::OpenModal;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;

static TABS: &[&str; 2] = &["Players", "Teams"];
const DROPDOWN_ROWS: usize = 8;
const FOCUS_COLOR: Color = Color::Yellow;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Players => draw_players(f, layout.main, app),
            MenuItem::Teams => draw_teams(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        if let Some(modal) = app.state.modals.active() {
            draw_modal(f, f.area(), modal);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn focus_color(focused: bool) -> Color {
    if focused { FOCUS_COLOR } else { Color::DarkGray }
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Players => 0,
        MenuItem::Teams => 1,
        MenuItem::Help => match app.state.previous_tab {
            MenuItem::Teams => 1,
            _ => 0,
        },
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: F1 ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Players tab
// ---------------------------------------------------------------------------

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let players = &app.state.players;
    let block = default_border(Color::White).title(" Compare Players ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 20 || inner.height < 8 {
        return;
    }

    let [controls, table_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    let [input_a, input_b, view_area] = Layout::horizontal([
        Constraint::Percentage(38),
        Constraint::Percentage(38),
        Constraint::Percentage(24),
    ])
    .areas(controls);

    let inputs = [input_a, input_b];
    for side in [Side::A, Side::B] {
        let focused = players.focus == PlayerFocus::Input(side);
        let title = match side {
            Side::A => " Player A ",
            Side::B => " Player B ",
        };
        draw_text_input(f, inputs[side.index()], title, players.input(side), focused);
    }
    draw_selector(f, view_area, " View ", players.view.label(), players.focus == PlayerFocus::View);

    draw_comparison_table(f, table_area, players.comparison.as_ref(), players.scroll_offset);
    draw_status_line(f, status_area, app, players.compared_at.as_deref());

    if let Some(side) = players.focused_side()
        && app.state.autofill.is_open_for(side)
        && let Some(dropdown) = app.state.autofill.dropdown()
    {
        let anchor = inputs[dropdown.side.index()];
        let entries: Vec<String> = dropdown.items.iter().map(|s| s.shown().to_string()).collect();
        draw_dropdown(f, anchor, area, &entries, dropdown.selected);
    }
}

// ---------------------------------------------------------------------------
// Teams tab
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let teams = &app.state.teams;
    let block = default_border(Color::White).title(" Compare Teams ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 20 || inner.height < 8 {
        return;
    }

    let [controls, table_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);
    let [input_a, input_b, view_area, type_area] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(22),
        Constraint::Percentage(18),
    ])
    .areas(controls);

    draw_text_input(f, input_a, " Team A ", &teams.inputs[0], teams.focus == TeamFocus::InputA);
    draw_text_input(f, input_b, " Team B ", &teams.inputs[1], teams.focus == TeamFocus::InputB);
    draw_selector(f, view_area, " View ", teams.view.label(), teams.focus == TeamFocus::View);
    let stat_label = match teams.stat_type {
        dugout_api::TeamStatType::Batting => "Batting",
        dugout_api::TeamStatType::Pitching => "Pitching",
    };
    draw_selector(f, type_area, " Stats ", stat_label, teams.focus == TeamFocus::StatType);

    draw_comparison_table(f, table_area, teams.comparison.as_ref(), teams.scroll_offset);
    draw_status_line(f, status_area, app, teams.compared_at.as_deref());
}

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

fn draw_text_input(f: &mut Frame, area: Rect, title: &str, text: &str, focused: bool) {
    let block = default_border(focus_color(focused)).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let shown = if focused { format!("{text}_") } else { text.to_string() };
    // Keep the cursor end visible when the name is longer than the box.
    let width = inner.width as usize;
    let count = shown.chars().count();
    let visible: String = shown.chars().skip(count.saturating_sub(width)).collect();
    let style = if focused {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    f.render_widget(Paragraph::new(visible).style(style), inner);
}

fn draw_selector(f: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let block = default_border(focus_color(focused)).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);
    let text = if focused { format!("◀ {value} ▶") } else { value.to_string() };
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn draw_dropdown(f: &mut Frame, anchor: Rect, bounds: Rect, entries: &[String], selected: usize) {
    let bottom = bounds.y + bounds.height;
    let below = anchor.y + anchor.height;
    if below + 3 > bottom {
        return;
    }
    let height = ((entries.len().min(DROPDOWN_ROWS) as u16) + 2).min(bottom - below);
    let rect = Rect::new(anchor.x, below, anchor.width, height);

    // Scroll the window so the highlighted entry stays visible.
    let rows = height.saturating_sub(2) as usize;
    let first = selected.saturating_sub(rows.saturating_sub(1));
    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .skip(first)
        .take(rows)
        .map(|(idx, entry)| {
            if idx == selected {
                Line::from(Span::styled(
                    format!("> {entry}"),
                    Style::default().fg(Color::Black).bg(FOCUS_COLOR),
                ))
            } else {
                Line::from(format!("  {entry}"))
            }
        })
        .collect();

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).block(default_border(FOCUS_COLOR).title(" Suggestions ")),
        rect,
    );
}

fn header_cell(header: &Header, alignment: Alignment) -> Cell<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            header.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(alignment),
    ];
    // No photo, no line.
    if let Some(url) = &header.photo_url {
        lines.push(
            Line::from(Span::styled(url.clone(), Style::default().fg(Color::DarkGray)))
                .alignment(alignment),
        );
    }
    Cell::from(Text::from(lines))
}

fn value_cell(cell: &compare::Cell, alignment: Alignment) -> Cell<'static> {
    let style = match cell.mark {
        Some(Mark::Better) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Some(Mark::Tied) => Style::default().fg(Color::Yellow),
        None => Style::default().fg(Color::White),
    };
    Cell::from(Line::from(Span::styled(cell.text.clone(), style)).alignment(alignment))
}

fn draw_comparison_table(f: &mut Frame, area: Rect, comparison: Option<&Comparison>, scroll: u16) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(comparison) = comparison else {
        f.render_widget(
            Paragraph::new("Enter two names and press Enter to compare.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let has_photo = comparison.headers.iter().any(|h| h.photo_url.is_some());
    let header = Row::new(vec![
        header_cell(&comparison.headers[0], Alignment::Right),
        Cell::from(Line::from("Stat").alignment(Alignment::Center)),
        header_cell(&comparison.headers[1], Alignment::Left),
    ])
    .height(if has_photo { 2 } else { 1 })
    .bottom_margin(1);

    let rows: Vec<Row> = comparison
        .rows
        .iter()
        .skip(scroll as usize)
        .map(|row| match row {
            compare::Row::Message { text } => Row::new(vec![
                Cell::from(""),
                Cell::from(
                    Line::from(Span::styled(text.clone(), Style::default().fg(Color::Red)))
                        .alignment(Alignment::Center),
                ),
                Cell::from(""),
            ]),
            compare::Row::Section { title } => Row::new(vec![
                Cell::from(""),
                Cell::from(
                    Line::from(Span::styled(
                        title.clone(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Center),
                ),
                Cell::from(""),
            ]),
            compare::Row::Stat { left, label, right } => Row::new(vec![
                value_cell(left, Alignment::Right),
                Cell::from(Line::from(label.clone()).alignment(Alignment::Center)),
                value_cell(right, Alignment::Left),
            ]),
        })
        .collect();

    let widths = if comparison.message_text().is_some() {
        [Constraint::Percentage(10), Constraint::Percentage(80), Constraint::Percentage(10)]
    } else {
        [Constraint::Percentage(40), Constraint::Percentage(20), Constraint::Percentage(40)]
    };
    let table = Table::new(rows, widths).header(header).column_spacing(2);
    f.render_widget(table, inner);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App, compared_at: Option<&str>) {
    let line = if let Some(err) = app.state.last_error.as_deref() {
        Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red)))
    } else {
        let mut spans = vec![Span::styled(
            "Tab focus  Enter compare  ←/→ change view  PgUp/PgDn scroll",
            Style::default().fg(Color::DarkGray),
        )];
        if let Some(at) = compared_at {
            spans.push(Span::styled(
                format!("  · compared at {at}"),
                Style::default().fg(Color::Gray),
            ));
        }
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_modal(f: &mut Frame, area: Rect, modal: &OpenModal) {
    let entries = modal.prompt.entries();
    let width = area.width.saturating_sub(4).min(72);
    let height = (entries.len() as u16 + 4).min(area.height.saturating_sub(2));
    if width < 20 || height < 5 {
        return;
    }
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let mut lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let label = format!("{}. {entry}", idx + 1);
            if idx == modal.selected {
                Line::from(Span::styled(
                    format!("> {label}"),
                    Style::default().fg(Color::Black).bg(FOCUS_COLOR),
                ))
            } else {
                Line::from(format!("  {label}"))
            }
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter select  Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).block(default_border(FOCUS_COLOR).title(modal.prompt.title())),
        rect,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = [
        ("F1 / ?", "help (Esc to leave)"),
        ("F2 / 1", "compare players"),
        ("F3 / 2", "compare teams"),
        ("Tab, Shift-Tab", "move focus between inputs and selectors"),
        ("Enter", "compare, or pick the highlighted suggestion"),
        ("↑ / ↓", "move through suggestions or dialog entries"),
        ("← / →", "change view or stat type"),
        ("Esc", "close suggestions, cancel a dialog"),
        ("Ctrl-U", "clear the focused player name"),
        ("PgUp / PgDn, j / k", "scroll the comparison"),
        ("Ctrl-L / \"", "toggle the log pane"),
        ("Ctrl-F / f", "toggle full screen"),
        ("Ctrl-C / q", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:>20}  "), Style::default().fg(FOCUS_COLOR)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(widget, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
