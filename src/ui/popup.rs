//! ポップアップ描画
//!
//! 新規ファイル・ファジーファインダー・エラーの各ポップアップ

use crate::shell::Shell;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// エラー・入力・ファインダーの順に重ねる（エラーが最前面）
pub fn render_popups(frame: &mut Frame, shell: &Shell) {
    let session = shell.session();

    if session.finder().is_open() {
        render_finder(frame, shell);
    }
    if let Some(input) = shell.new_file_input() {
        render_input(frame, "New filename", input);
    }
    if let Some(message) = session.error_message() {
        render_error(frame, message);
    }
}

fn render_input(frame: &mut Frame, title: &str, input: &str) {
    let area = centered(frame.area(), 50, 3);
    frame.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(input).block(block), area);
    frame.set_cursor_position((inner.x + input.width() as u16, inner.y));
}

fn render_finder(frame: &mut Frame, shell: &Shell) {
    let session = shell.session();
    let area = centered(frame.area(), 60, 14);
    frame.render_widget(Clear, area);

    let query_area = Rect { height: 3, ..area };
    let list_area = Rect {
        y: area.y + 3,
        height: area.height.saturating_sub(3),
        ..area
    };

    let query = session.finder().query();
    let title = format!("Find file ({} matches)", session.fuzzy_match_count());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(query_area);
    frame.render_widget(Paragraph::new(query).block(block), query_area);
    if shell.finder_focused() && shell.new_file_input().is_none() && session.error_message().is_none() {
        frame.set_cursor_position((inner.x + query.width() as u16, inner.y));
    }

    let items: Vec<ListItem> = session
        .fuzzy_matches()
        .into_iter()
        .map(|name| ListItem::new(name.to_string()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if session.fuzzy_match_count() > 0 {
        state.select(Some(session.finder().effective_selection()));
    }
    frame.render_stateful_widget(list, list_area, &mut state);
}

fn render_error(frame: &mut Frame, message: &str) {
    let area = centered(frame.area(), 60, 5);
    frame.render_widget(Clear, area);
    let text = vec![
        Line::from(message.to_string()),
        Line::styled("[Enter] OK", Style::default().fg(Color::DarkGray)),
    ];
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Error"),
        );
    frame.render_widget(popup, area);
}

/// 画面中央の矩形（画面より大きければ画面に収める）
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
