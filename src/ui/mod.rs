//! UIモジュール
//!
//! ratatui によるシェル状態の描画。状態は一切変更しない。

pub mod popup;

use crate::buffer::SlotId;
use crate::shell::{cursor, Focus, Shell};
use ratatui::{
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// ファイル一覧ペインの幅
pub const FILE_PANE_WIDTH: u16 = 24;
/// タブ文字の表示幅
const TAB_WIDTH: usize = 4;

/// 画面全体を描画
pub fn render(frame: &mut Frame, shell: &Shell) {
    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(frame.area());

    render_menu_bar(frame, rows[0], shell);

    let mut constraints = Vec::new();
    if shell.show_files() {
        constraints.push(Constraint::Length(FILE_PANE_WIDTH));
    }
    if shell.show_preview() {
        constraints.push(Constraint::Ratio(1, 2));
        constraints.push(Constraint::Ratio(1, 2));
    } else {
        constraints.push(Constraint::Min(10));
    }
    let columns = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints(constraints)
        .split(rows[1]);

    let mut next = 0;
    if shell.show_files() {
        render_file_pane(frame, columns[next], shell);
        next += 1;
    }
    render_editor(frame, columns[next], shell);
    if shell.show_preview() {
        render_preview(frame, columns[next + 1]);
    }

    popup::render_popups(frame, shell);
}

fn render_menu_bar(frame: &mut Frame, area: Rect, shell: &Shell) {
    let mut spans = vec![Span::styled(
        " afaire ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for action in shell.keymap().menu() {
        spans.push(Span::raw(format!(" {} ", action.description())));
        spans.push(Span::styled(
            format!("[{}]", action.shortcut()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(bar, area);
}

fn render_file_pane(frame: &mut Frame, area: Rect, shell: &Shell) {
    let session = shell.session();
    let items: Vec<ListItem> = session
        .files()
        .iter()
        .map(|name| {
            // 表示中のファイルは装飾付きラベルで、判定はファイル名で行う
            let text = if session.is_open_file(name) {
                session.active_buffer().display_label().to_string()
            } else {
                name.clone()
            };
            let style = if session.is_open_file(name) {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let border_style = if shell.focus() == Focus::Files {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Files"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if shell.focus() == Focus::Files && !session.files().is_empty() {
        state.select(Some(shell.file_cursor()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_editor(frame: &mut Frame, area: Rect, shell: &Shell) {
    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    render_tabs(frame, rows[0], shell);

    let buffer = shell.session().active_buffer();
    let text = buffer.content().replace('\t', &" ".repeat(TAB_WIDTH));
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(rows[1]);

    let at = shell.cursor();
    let line = cursor::line_index(buffer.content(), at);
    let line_prefix = &buffer.content()[cursor::line_start(buffer.content(), at)..at];
    let col = display_width(line_prefix);

    let scroll_y = line.saturating_sub(inner.height.saturating_sub(1) as usize);
    let scroll_x = col.saturating_sub(inner.width.saturating_sub(1) as usize);
    let paragraph = Paragraph::new(text)
        .block(block)
        .scroll((saturating_u16(scroll_y), saturating_u16(scroll_x)));
    frame.render_widget(paragraph, rows[1]);

    let overlay_open = shell.session().error_message().is_some()
        || shell.new_file_input().is_some()
        || shell.session().finder().is_open();
    if shell.focus() == Focus::Editor && !overlay_open {
        frame.set_cursor_position((
            inner.x + (col - scroll_x) as u16,
            inner.y + (line - scroll_y) as u16,
        ));
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, shell: &Shell) {
    let session = shell.session();
    let table = session.buffers();
    let spans: Vec<Span> = table
        .active_slots()
        .filter_map(|slot: SlotId| table.get(slot).map(|b| (slot, b)))
        .map(|(slot, buffer)| {
            let style = if slot == session.active_slot() {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Span::styled(format!("{} ", buffer.display_label()), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_preview(frame: &mut Frame, area: Rect) {
    let preview = Paragraph::new("Markdown Preview").block(Block::default().borders(Borders::ALL));
    frame.render_widget(preview, area);
}

/// タブ展開後の表示幅
fn display_width(text: &str) -> usize {
    text.split('\t')
        .map(UnicodeWidthStr::width)
        .sum::<usize>()
        + text.matches('\t').count() * TAB_WIDTH
}

/// 画面座標へ変換（範囲外は上限に張り付く）
fn saturating_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EditorSession;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn display_width_counts_tabs_and_wide_chars() {
        assert_eq!(display_width("ab"), 2);
        assert_eq!(display_width("\tx"), 5);
        assert_eq!(display_width("あ"), 2);
    }

    #[test]
    fn scroll_offsets_saturate() {
        assert_eq!(saturating_u16(12), 12);
        assert_eq!(saturating_u16(70_000), u16::MAX);
    }

    #[test]
    fn renders_file_list_with_dirty_label() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let mut shell = Shell::new(EditorSession::with_directory(dir.path()).unwrap());
        shell.frame();
        shell.session_mut().open("a.txt").unwrap();
        shell.session_mut().mark_edited();

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|frame| render(frame, &shell)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("* a.txt"));
        assert!(screen.contains("hello"));
        assert!(screen.contains("Markdown Preview"));
    }
}
