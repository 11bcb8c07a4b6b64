use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use super::app::{App, DisplayItem, InputField, InputMode, ViewMode};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Status
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Weekend => {
            let rows: Vec<Row> = app
                .display_items
                .iter()
                .map(|item| match item {
                    DisplayItem::DayHeader(day, date, count) => Row::new(vec![
                        Cell::from(""),
                        Cell::from(format!("{} {} ({})", day, date.format("%d/%m"), count)),
                        Cell::from(""),
                        Cell::from(""),
                        Cell::from(""),
                    ])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                    DisplayItem::Task(t) => {
                        let style = if t.is_done {
                            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                        } else {
                            Style::default().fg(Color::White)
                        };
                        Row::new(vec![
                            Cell::from(t.id.to_string()),
                            Cell::from(format!("  {}", t.title)),
                            Cell::from(t.display_order.to_string()),
                            Cell::from(if t.is_recurring { "↻" } else { "" }),
                            Cell::from(if t.is_done { "Done" } else { "Open" }),
                        ])
                        .style(style)
                    }
                })
                .collect();

            let widths = [
                Constraint::Length(5),
                Constraint::Min(30),
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Length(6),
            ];

            let title = format!(
                "Weekend {} - {}{}",
                app.weekend.friday.format("%d/%m/%Y"),
                app.weekend.sunday.format("%d/%m/%Y"),
                if app.show_completed { "" } else { " (open only)" }
            );
            let table = Table::new(rows, widths)
                .header(Row::new(vec!["ID", "Task", "Order", "", "Status"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title(title))
                .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.state);
        }
        ViewMode::Definitions => {
            let rows: Vec<Row> = app
                .definitions
                .iter()
                .map(|d| {
                    Row::new(vec![
                        Cell::from(d.day_offset.name()),
                        Cell::from(d.order.to_string()),
                        Cell::from(d.title.clone()),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Min(30),
            ];

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Day", "Order", "Title"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title("Weekly list"))
                .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.definition_state);
        }
    }

    let status = Paragraph::new(app.status.as_deref().unwrap_or(""))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(status, chunks[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Weekend => "q: Quit | a: Add | Space: Done/Undo | n: Title | t: Due | o: Order | d: Del | c: Show Done | [ ]: Weekend | 0: Target | g: Generate | v: Weekly list",
            ViewMode::Definitions => "q: Quit | a: Add to weekly list | v: View Weekend",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    if app.input_mode == InputMode::Normal {
        return;
    }

    let area = centered_rect(60, 3, f.area());
    f.render_widget(Clear, area);

    let title = match app.input_mode {
        InputMode::Adding => match (&app.view_mode, app.add_state.step) {
            (_, 0) => "Add: Enter Title",
            (_, 1) => "Add: Day (fri/sat/sun, empty = selected)",
            (ViewMode::Weekend, 2) => "Add: Recurring every weekend? (y/N)",
            _ => "Add",
        },
        InputMode::Editing => match app.input_field {
            InputField::Title => "Edit Title",
            InputField::Due => "Edit Due Date (YYYY-MM-DD)",
            InputField::Order => "Edit Order",
            InputField::None => "Edit",
        },
        InputMode::Normal => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
