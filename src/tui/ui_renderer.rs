use super::app_logic::TuiApp;
use super::app_state::{AppMode, BatchKind, StatusKind};
use crate::file_tree::EntryKind;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

fn draw_help_block(f: &mut Frame, area: Rect) {
    let help_text_lines = vec![
        Line::from("Arrows/jk: Nav | Space/Enter: Select | Tab/o: Fold | c: Copy | q/Esc: Quit"),
        Line::from("d: Remove Selected | C: Clear All | x: XML Format | f: Filepath | t: File Types"),
    ];
    let help_paragraph = Paragraph::new(help_text_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("clipsum – Files Summarizer"),
    );
    f.render_widget(help_paragraph, area);
}

fn draw_main_list_block(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    app.list_viewport_height = area.height.saturating_sub(2) as usize;
    app.ensure_cursor_in_viewport();

    let rows = app.tree.visible_rows();
    let visible = rows
        .get(app.scroll_offset..(app.scroll_offset + app.list_viewport_height).min(rows.len()))
        .unwrap_or(&[]);

    let list_items: Vec<ListItem> = visible
        .iter()
        .filter_map(|&(id, depth)| {
            let entry = app.tree.node(id)?;
            let checkbox = if entry.is_dir() {
                match app.tree.folder_selection(id) {
                    (_, true) => "[x] ",
                    (true, false) => "[-] ",
                    (false, _) => "[ ] ",
                }
            } else if entry.selected {
                "[x] "
            } else {
                "[ ] "
            };
            let fold = match entry.kind {
                EntryKind::Folder if entry.is_expanded => "[-] ",
                EntryKind::Folder => "[+] ",
                _ => "    ",
            };
            let mut name = entry.display_name();
            if entry.is_dir() && name != "/" {
                name.push('/');
            }
            let line = format!(
                "{}{}{}{} {}",
                "  ".repeat(depth),
                fold,
                checkbox,
                entry.symbol(),
                name
            );
            Some(ListItem::new(line))
        })
        .collect();

    let title = match &app.batch {
        Some(state) if state.kind == BatchKind::Scan => "Tracked files (scanning…)".to_string(),
        Some(_) => "Tracked files (copying…)".to_string(),
        None => format!("Tracked files ({})", app.tree.file_count()),
    };

    let list_widget = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut list_state = ratatui::widgets::ListState::default();
    if app.cursor >= app.scroll_offset && app.cursor < app.scroll_offset + app.list_viewport_height
    {
        list_state.select(Some(app.cursor - app.scroll_offset));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state);
}

fn draw_types_block(f: &mut Frame, app: &TuiApp, cursor: usize, area: Rect) {
    let items: Vec<ListItem> = app
        .settings
        .allowed_file_types
        .iter()
        .map(|t| ListItem::new(t.clone()))
        .collect();
    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Allowed file types (d: remove | r: reset | q: back)"),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut list_state = ratatui::widgets::ListState::default();
    if !app.settings.allowed_file_types.is_empty() {
        list_state.select(Some(cursor));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state);
}

fn draw_prompt_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let text = match &app.mode {
        AppMode::ConfirmClear => "Are you sure you want to remove all items? [y/n]".to_string(),
        AppMode::AskExtension { extension, .. } => {
            format!("Allow files with extension '{extension}'? [y/n]")
        }
        AppMode::Normal | AppMode::ManageTypes { .. } => return,
    };
    let prompt = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Confirm"));
    f.render_widget(prompt, area);
}

fn draw_status_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let (kind, message) = &app.status;
    let style = match kind {
        StatusKind::Info => Style::default(),
        StatusKind::Warning => Style::default().fg(Color::Yellow),
        StatusKind::Error => Style::default().fg(Color::Red),
    };
    let status = Paragraph::new(format!("{} {}", kind.symbol(), message))
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

pub(super) fn ui_frame(frame: &mut Frame, app: &mut TuiApp) {
    let prompt_height = if matches!(
        app.mode,
        AppMode::ConfirmClear | AppMode::AskExtension { .. }
    ) {
        3
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(prompt_height),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_help_block(frame, chunks[0]);
    if let AppMode::ManageTypes { cursor } = app.mode {
        draw_types_block(frame, app, cursor, chunks[1]);
    } else {
        draw_main_list_block(frame, app, chunks[1]);
    }
    if prompt_height > 0 {
        draw_prompt_block(frame, app, chunks[2]);
    }
    draw_status_block(frame, app, chunks[3]);
}
