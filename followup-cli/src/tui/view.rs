use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{Form, FormField, Screen, State, Status};

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;
const FOCUS: Color = Color::Yellow;

pub fn render(frame: &mut Frame, state: &mut State) {
    let [title, body, status, help] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    let running = if state.running { "  [driver running]" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Follow-up automation", Style::default().fg(ACCENT).bold()),
            Span::styled(
                format!("  data: {}", state.data_dir.root().display()),
                Style::default().fg(MUTED),
            ),
            Span::styled(running, Style::default().fg(FOCUS).bold()),
        ])),
        title,
    );

    match state.screen {
        Screen::Browse => render_browser(frame, body, state),
        Screen::Form => render_form_screen(frame, body, state),
    }

    render_status(frame, status, state.status.as_ref());
    render_help(frame, help, state.screen);
}

fn render_browser(frame: &mut Frame, area: Rect, state: &mut State) {
    let inner_height = area.height.saturating_sub(2) as usize;
    state.browser.set_viewport_height(inner_height);

    let browser = &state.browser;
    let items: Vec<ListItem> = browser
        .entries()
        .iter()
        .map(|entry| {
            if entry.is_dir {
                ListItem::new(format!("{}/", entry.name)).style(Style::default().fg(ACCENT))
            } else {
                ListItem::new(entry.name.clone())
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", browser.current_path().display())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default()
        .with_selected(browser.list_state().selected())
        .with_offset(browser.list_state().scroll_offset());

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_form_screen(frame: &mut Frame, area: Rect, state: &State) {
    let [form_area, log_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .areas(area);

    if let Some(form) = &state.form {
        render_form(frame, form_area, form);
    }

    let height = log_area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = state
        .log
        .visible(height)
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();

    let title = if state.log.scroll > 0 {
        format!(" Driver output (scrolled {} up) ", state.log.scroll)
    } else {
        " Driver output ".to_string()
    };

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        log_area,
    );
}

fn render_form(frame: &mut Frame, area: Rect, form: &Form) {
    let file_name = form
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default().fg(FOCUS).bold()
        } else {
            Style::default().fg(ACCENT)
        };

        if field == FormField::Run {
            lines.push(Line::default());
            let button = Span::styled(
                "[ Run ]",
                if focused {
                    Style::default().fg(Color::Black).bg(FOCUS).bold()
                } else {
                    Style::default().bold()
                },
            );
            lines.push(Line::from(vec![Span::raw("  "), button]));
            continue;
        }

        let value = field_value(form, field);
        let marker = if focused { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<16}", field.label()), label_style),
            Span::raw(value),
        ]));

        if field == FormField::HeaderRow {
            lines.push(Line::from(Span::styled(
                format!("    {}", form.preview()),
                Style::default().fg(MUTED).italic(),
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", file_name)),
            ),
        area,
    );
}

fn field_value(form: &Form, field: FormField) -> String {
    let choice = |value: Option<&str>| format!("< {} >", value.unwrap_or("-"));
    match field {
        FormField::Sheet => choice(form.sheet.value()),
        FormField::HeaderRow => form.header_row.display(),
        FormField::StudentIdColumn => choice(form.student_id_column.value()),
        FormField::CpfColumn => choice(form.cpf_column.value()),
        FormField::Attendant => form.attendant.display(),
        FormField::Office => choice(form.office.value()),
        FormField::Email => form.email.display(),
        FormField::Password => form.password.display(),
        FormField::Run => String::new(),
    }
}

fn render_status(frame: &mut Frame, area: Rect, status: Option<&Status>) {
    let line = match status {
        Some(Status::Info(message)) => Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Green),
        )),
        Some(Status::Error(message)) => Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Red).bold(),
        )),
        None => Line::default(),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, area: Rect, screen: Screen) {
    let keys: &[(&str, &str)] = match screen {
        Screen::Browse => &[
            ("↑↓", "Navigate"),
            ("Enter", "Open"),
            ("Backspace", "Go up"),
            ("Tab", "Form"),
            ("q", "Quit"),
        ],
        Screen::Form => &[
            ("Tab/↑↓", "Field"),
            ("←→", "Change"),
            ("F5", "Run"),
            ("PgUp/PgDn", "Scroll log"),
            ("Esc", "Files"),
            ("Ctrl+C", "Quit"),
        ],
    };

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(format!(" {} ", key), Style::default().fg(FOCUS)),
                Span::styled(format!("{} ", action), Style::default().fg(MUTED)),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
