// File: src/tui/view.rs
use crate::board::LoadState;
use crate::router::Route;
use crate::tui::form::{FieldKind, Form};
use crate::tui::state::{AppState, Overlay};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

fn help_line(label: &'static str, color: Color, keys: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(keys),
    ])
}

fn full_help(route: Route) -> Vec<Line<'static>> {
    let mut lines = vec![help_line(
        " GLOBAL ",
        Color::Cyan,
        " ?:Toggle Help  q:Quit  Ctrl+C:Quit",
    )];
    match route {
        Route::Dashboard => {
            lines.push(help_line(
                " TASKS ",
                Color::Green,
                " a:Add  e/Enter:Edit  d:Delete  Space:Toggle Done  j/k:Up/Down",
            ));
            lines.push(help_line(
                " PAGES ",
                Color::Yellow,
                " n/Right:Next  p/Left:Previous  r:Reload",
            ));
            lines.push(help_line(
                " ACCOUNT ",
                Color::Magenta,
                " P:Profile  L:Logout",
            ));
        }
        Route::Profile => {
            lines.push(help_line(
                " PROFILE ",
                Color::Green,
                " e:Edit  Enter:Save  Esc:Cancel/Back  r:Reload  L:Logout",
            ));
        }
        Route::Login | Route::Register => {
            lines.push(help_line(
                " FORM ",
                Color::Green,
                " Tab/Up/Down:Field  Enter:Submit  Esc:Back",
            ));
        }
        Route::NotFound => {
            lines.push(help_line(" 404 ", Color::Red, " Any key:Go Home"));
        }
    }
    lines
}

fn short_help(state: &AppState) -> &'static str {
    match state.route() {
        Route::Login => "Tab:Next field  Enter:Login  Ctrl+R:Register  Esc:Quit",
        Route::Register => "Tab:Next field  Enter:Register  Ctrl+L:Login  Esc:Back",
        Route::Dashboard => match state.overlay {
            Overlay::None => "?:Help q:Quit a:Add e:Edit Spc:Done d:Del n/p:Page P:Profile",
            Overlay::ConfirmDelete { .. } => "y:Delete  n/Esc:Cancel",
            _ => "Tab:Next field  Space:Toggle  Enter:Save  Esc:Cancel",
        },
        Route::Profile => {
            if state.profile_form.is_some() {
                "Tab:Next field  Enter:Save  Esc:Cancel"
            } else {
                "?:Help q:Quit e:Edit Esc:Dashboard L:Logout"
            }
        }
        Route::NotFound => "Any key:Go Home  q:Quit",
    }
}

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let resolution = state.router.resolution();

    let help_lines = full_help(resolution.route);
    let footer_height = if state.show_full_help {
        Constraint::Length(help_lines.len() as u16 + 2)
    } else {
        Constraint::Length(3)
    };
    let header_height = if resolution.chrome {
        Constraint::Length(3)
    } else {
        Constraint::Length(0)
    };

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([header_height, Constraint::Min(0), footer_height])
        .split(f.area());

    if resolution.chrome {
        draw_header(f, v_chunks[0], resolution.route);
    }

    let body = v_chunks[1];
    match resolution.route {
        Route::Login => {
            let area = centered_rect(60, 60, body);
            draw_form(f, area, &state.login_form, Color::Cyan);
        }
        Route::Register => {
            let area = centered_rect(60, 80, body);
            draw_form(f, area, &state.register_form, Color::Cyan);
        }
        Route::Dashboard => draw_dashboard(f, body, state),
        Route::Profile => draw_profile(f, body, state),
        Route::NotFound => {
            let p = Paragraph::new(vec![
                Line::from(Span::styled(
                    "404",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from("Page not found"),
                Line::from(""),
                Line::from("Press any key to go home"),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(p, centered_rect(50, 40, body));
        }
    }

    // Footer
    let footer_area = v_chunks[2];
    f.render_widget(Clear, footer_area);
    if state.show_full_help {
        let p = Paragraph::new(help_lines)
            .block(Block::default().borders(Borders::ALL).title(" Help "))
            .wrap(Wrap { trim: false });
        f.render_widget(p, footer_area);
    } else {
        let color = if state.message.starts_with("Error") {
            Color::LightRed
        } else {
            Color::Cyan
        };
        let status = Paragraph::new(state.message.clone())
            .style(Style::default().fg(color))
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                    .title(" Status "),
            );
        let help = Paragraph::new(short_help(state))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                    .title(" Actions "),
            );
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(footer_area);
        f.render_widget(status, chunks[0]);
        f.render_widget(help, chunks[1]);
    }
}

fn draw_header(f: &mut Frame, area: Rect, route: Route) {
    let tab = |r: Route, key: &'static str| {
        let style = if r == route {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!(" {} {} ", key, r), style)
    };
    let line = Line::from(vec![
        Span::styled(
            " Task Manager ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        tab(Route::Dashboard, "D"),
        tab(Route::Profile, "P"),
        Span::styled(" L Logout ", Style::default().fg(Color::Gray)),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_dashboard(f: &mut Frame, area: Rect, state: &mut AppState) {
    let board = &state.board;
    let pagination_height = if board.show_pagination() { 1 } else { 0 };

    let selected_desc = state
        .selected_task()
        .map(|t| t.description_text().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "No details.".to_string());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(4),
            Constraint::Length(pagination_height),
        ])
        .split(area);

    let board = &state.board;
    let title = match board.state() {
        LoadState::Loading => " Tasks (Loading...) ".to_string(),
        LoadState::Errored(_) => " Tasks (Failed to load) ".to_string(),
        _ => format!(" Tasks ({}) ", board.tasks().len()),
    };

    if board.tasks().is_empty() && !board.is_loading() {
        let p = Paragraph::new("No tasks found. Add your first task!")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, chunks[0]);
    } else {
        let items: Vec<ListItem> = board
            .tasks()
            .iter()
            .map(|t| {
                let (check, style) = if t.completed {
                    (
                        "[x]",
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    ("[ ]", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", check)),
                    Span::styled(t.title.clone(), style),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .highlight_style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .bg(Color::Green)
                    .fg(Color::Black),
            );
        f.render_stateful_widget(list, chunks[0], &mut state.list_state);
    }

    let details = Paragraph::new(selected_desc)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Description "));
    f.render_widget(details, chunks[1]);

    let board = &state.board;
    if board.show_pagination() {
        let prev = if board.current_page() > 1 { "< Prev" } else { "      " };
        let next = if board.current_page() < board.total_pages() {
            "Next >"
        } else {
            "      "
        };
        let p = Paragraph::new(format!(
            "{}   Page {} of {}   {}",
            prev,
            board.current_page(),
            board.total_pages(),
            next
        ))
        .alignment(Alignment::Center);
        f.render_widget(p, chunks[2]);
    }

    match &state.overlay {
        Overlay::None => {}
        Overlay::AddTask(form) | Overlay::EditTask { form, .. } => {
            let area = centered_rect(60, 60, f.area());
            f.render_widget(Clear, area);
            draw_form(f, area, form, Color::Yellow);
        }
        Overlay::ConfirmDelete { title, .. } => {
            let area = centered_rect(50, 25, f.area());
            let p = Paragraph::new(vec![
                Line::from(""),
                Line::from(format!("Delete \"{}\"?", title)),
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        " [y] ",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("Delete    "),
                    Span::styled(
                        " [n] ",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("Cancel"),
                ]),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Confirm Delete ")
                    .border_style(Style::default().fg(Color::LightRed)),
            );
            f.render_widget(Clear, area);
            f.render_widget(p, area);
        }
    }
}

fn draw_profile(f: &mut Frame, area: Rect, state: &AppState) {
    if let Some(form) = &state.profile_form {
        draw_form(f, centered_rect(60, 80, area), form, Color::Yellow);
        return;
    }

    let lines = match (state.profile.state(), state.profile.user()) {
        (LoadState::Errored(msg), _) => vec![Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(Color::LightRed),
        ))],
        (_, Some(user)) => vec![
            Line::from(vec![
                Span::styled("Name:  ", Style::default().fg(Color::Gray)),
                Span::styled(
                    user.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Email: ", Style::default().fg(Color::Gray)),
                Span::raw(user.email.clone()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press e to edit",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        _ => vec![Line::from("Loading...")],
    };
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Profile "));
    f.render_widget(p, centered_rect(60, 50, area));
}

fn draw_form(f: &mut Frame, area: Rect, form: &Form, accent: Color) {
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor: Option<(u16, u16)> = None;

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(field.label, label_style)));

        let value_line = lines.len() as u16;
        lines.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(accent)),
            Span::raw(field.display()),
        ]));
        if focused && field.kind != FieldKind::Checkbox {
            // "> " prefix plus the left border
            cursor = Some((area.x + 3 + field.cursor as u16, area.y + 1 + value_line));
        }

        match form.error_for(field.key) {
            Some(err) => lines.push(Line::from(Span::styled(
                err,
                Style::default().fg(Color::LightRed),
            ))),
            None => lines.push(Line::from("")),
        }
    }

    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", form.title))
            .border_style(Style::default().fg(accent)),
    );
    f.render_widget(p, area);

    if let Some((x, y)) = cursor
        && area.width > 2
        && y < area.y + area.height.saturating_sub(1)
    {
        f.set_cursor_position((x.min(area.x + area.width - 2), y));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
