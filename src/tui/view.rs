use chrono::Local;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::utils::date::format_due;

use super::app::{AppState, EditorField, EditorState, Mode, StatusKind};

const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);

const HELP_TEXT: &str =
    "j/k move  space done  a add  e edit  d delete  / search  s sort  ? help  q quit";

pub fn render(frame: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(frame.area());

    render_list(frame, app, chunks[0]);
    render_footer(frame, app, chunks[1]);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let today = Local::now().date_naive();
    let tasks = app.visible();
    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let mark = if task.done { "[x]" } else { "[ ]" };
            let due_style = if task.is_overdue(today) {
                Style::default().fg(COLOR_ERROR)
            } else {
                Style::default().fg(COLOR_MUTED)
            };
            let label_style = if task.done {
                Style::default().fg(COLOR_MUTED).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(COLOR_TEXT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3} ", task.id), Style::default().fg(COLOR_MUTED)),
                Span::styled(
                    format!("{} ", mark),
                    Style::default().fg(if task.done { COLOR_SUCCESS } else { COLOR_TEXT }),
                ),
                Span::styled(format!("{} ", format_due(task.due)), due_style),
                Span::styled(task.label.replace(['\n', '\r', '\t'], " "), label_style),
            ]))
        })
        .collect();

    let mut title = format!(" Tasks ({}) - {} ", tasks.len(), app.sort_view.label());
    if !app.filter.is_empty() {
        title.push_str(&format!("- search: {} ", app.filter));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        )
        .highlight_style(Style::default().bg(Color::Rgb(52, 56, 60)).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !tasks.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let line = match &app.mode {
        Mode::Filter => Line::from(vec![
            Span::styled("Search: ", Style::default().fg(COLOR_ACCENT)),
            Span::raw(app.filter.clone()),
            Span::styled("_", Style::default().fg(COLOR_ACCENT)),
        ]),
        Mode::Editor(editor) => editor_line(editor),
        Mode::ConfirmDelete(id) => Line::from(Span::styled(
            format!("Delete task {}? (y/n)", id),
            Style::default().fg(COLOR_ERROR),
        )),
        Mode::Help => Line::from(Span::styled(HELP_TEXT, Style::default().fg(COLOR_TEXT))),
        Mode::Normal => match &app.status {
            Some((StatusKind::Error, message)) => {
                Line::from(Span::styled(message.clone(), Style::default().fg(COLOR_ERROR)))
            }
            Some((StatusKind::Info, message)) => {
                Line::from(Span::styled(message.clone(), Style::default().fg(COLOR_SUCCESS)))
            }
            None => Line::from(Span::styled("? for help", Style::default().fg(COLOR_MUTED))),
        },
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn editor_line(editor: &EditorState) -> Line<'static> {
    let title = if editor.target.is_some() { "Edit" } else { "Add" };
    let field_style = |field: EditorField| {
        if editor.field == field {
            Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_MUTED)
        }
    };
    Line::from(vec![
        Span::styled(format!("{} ", title), Style::default().fg(COLOR_TEXT)),
        Span::styled("label: ", field_style(EditorField::Label)),
        Span::raw(editor.label.clone()),
        Span::styled("  due: ", field_style(EditorField::Due)),
        Span::raw(editor.due.clone()),
        Span::styled("  (Tab switch, Enter next/save, Esc cancel)", Style::default().fg(COLOR_MUTED)),
    ])
}
