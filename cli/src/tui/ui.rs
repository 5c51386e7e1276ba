use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use timetable_core::{
    class_for_slot, Class, DocumentStore, Slot, DAY_COUNT, DAY_LABELS, PERIOD_COUNT,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::app::App;
use crate::tui::timetable::Modal;

const PERIOD_COLUMN_WIDTH: u16 = 13;
const ROW_HEIGHT: u16 = 3;

pub fn draw<S: DocumentStore>(f: &mut Frame, app: &App<S>) {
    let size = f.area();

    if app.loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(loading, centered_rect(size.width, 1, size));
        return;
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(1),    // Grid
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "ATTENDANCE",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(app.config.term.as_str(), Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    draw_grid(f, app, main_chunks[1]);

    let footer = Paragraph::new(help_text(&app.timetable.modal))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[2]);

    match &app.timetable.modal {
        Modal::None => {}
        Modal::Add { slot } => draw_add_dialog(f, app, *slot),
        Modal::Detail { .. } => {
            if let Some(class) = app.timetable.selected_class(&app.classes) {
                draw_detail_dialog(f, app, class);
            }
        }
        Modal::ConfirmDelete { .. } => draw_confirm_dialog(f),
    }

    if let Some(message) = app.alert {
        draw_alert(f, message);
    }
}

fn help_text(modal: &Modal) -> &'static str {
    match modal {
        Modal::None => "←↓↑→/hjkl: Move | Enter: Open | p: Present | x: Absent | q: Quit",
        Modal::Add { .. } => "Enter: Add | Esc: Cancel",
        Modal::Detail { .. } => "d: Delete | Esc: Close",
        Modal::ConfirmDelete { .. } => "y: Delete | n: Back",
    }
}

fn period_color(period: u8) -> Color {
    match period {
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Magenta,
        5 => Color::LightRed,
        6 => Color::Cyan,
        _ => Color::Gray,
    }
}

fn draw_grid<S: DocumentStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let day_columns = DAY_COUNT as u16;
    let cell_width = area
        .width
        .saturating_sub(2 + PERIOD_COLUMN_WIDTH + day_columns)
        / day_columns;

    let rows: Vec<Row> = (1..=PERIOD_COUNT)
        .map(|period| {
            let color = period_color(period);
            let mut cells = vec![Cell::from(Text::from(vec![
                Line::from(Span::styled(
                    period.to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    app.config.period_label(period),
                    Style::default().fg(Color::DarkGray),
                )),
            ]))];

            for day in 0..DAY_COUNT {
                // Both indexes come from the grid's own ranges.
                let Ok(slot) = Slot::new(day, period) else { continue };
                let class = class_for_slot(&app.classes, slot);
                let mut cell = grid_cell(class, color, cell_width as usize);
                if slot == app.timetable.cursor {
                    cell = cell.style(Style::default().add_modifier(Modifier::REVERSED));
                }
                cells.push(cell);
            }

            Row::new(cells).height(ROW_HEIGHT)
        })
        .collect();

    let mut widths = vec![Constraint::Length(PERIOD_COLUMN_WIDTH)];
    widths.extend((0..DAY_COUNT).map(|_| Constraint::Fill(1)));

    let header = Row::new(
        std::iter::once("Period").chain(DAY_LABELS.iter().copied()).collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::Yellow));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(" Timetable ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );

    f.render_widget(table, area);
}

fn grid_cell(class: Option<&Class>, color: Color, width: usize) -> Cell<'static> {
    match class {
        Some(class) => Cell::from(Text::from(vec![
            Line::from(Span::styled(
                truncate(&class.name, width),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("[p]", Style::default().fg(Color::Green)),
                Span::raw(" "),
                Span::styled("[x]", Style::default().fg(Color::Red)),
            ]),
        ])),
        None => Cell::from(Span::styled("+", Style::default().fg(Color::DarkGray))),
    }
}

/// Cut `text` to at most `width` terminal columns, marking the cut with "…".
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn dialog(f: &mut Frame, title: &str, width: u16, height: u16, border: Color) -> Rect {
    let area = centered_rect(width, height, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

fn draw_add_dialog<S: DocumentStore>(f: &mut Frame, app: &App<S>, slot: Slot) {
    let title = format!("Add class: {} {}", slot.day_label(), slot.period());
    let inner = dialog(f, &title, 44, 6, Color::Blue);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    let input = Paragraph::new(app.timetable.input.as_str())
        .block(Block::default().title(" Class name ").borders(Borders::ALL));
    f.render_widget(input, chunks[0]);

    let before_cursor: String = app
        .timetable
        .input
        .chars()
        .take(app.timetable.cursor_position)
        .collect();
    f.set_cursor_position((
        chunks[0].x + 1 + before_cursor.width() as u16,
        chunks[0].y + 1,
    ));

    let hint = Paragraph::new("Enter: Add | Esc: Cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);
}

fn draw_detail_dialog<S: DocumentStore>(f: &mut Frame, app: &App<S>, class: &Class) {
    let counts = class.counts();
    let day = DAY_LABELS.get(class.day as usize).copied().unwrap_or("?");
    let inner = dialog(f, &class.name, 44, 8, Color::Cyan);

    let text = vec![
        Line::from(vec![
            Span::styled("Slot: ", Style::default().fg(Color::Blue)),
            Span::raw(format!(
                "{} {} ({})",
                day,
                class.period,
                app.config.period_label(class.period)
            )),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Present: ", Style::default().fg(Color::Blue)),
            Span::styled(
                counts.present.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Absent:  ", Style::default().fg(Color::Blue)),
            Span::styled(
                counts.absent.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("d: Delete | Esc: Close", Style::default().fg(Color::DarkGray))),
    ];

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

fn draw_confirm_dialog(f: &mut Frame) {
    let inner = dialog(f, "Confirm", 36, 5, Color::Red);
    let text = vec![
        Line::from("Really delete this class?"),
        Line::from(""),
        Line::from(Span::styled("y: Yes | n: No", Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn draw_alert(f: &mut Frame, message: &str) {
    let inner = dialog(f, "Error", 40, 5, Color::Red);
    let text = vec![
        Line::from(Span::styled(message, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Press any key", Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
