//! カーソル移動
//!
//! バイトオフセットで表したカーソルを文字境界・行単位で動かす

/// 直前の文字境界
pub fn prev_boundary(text: &str, at: usize) -> usize {
    let at = clamp(text, at);
    text[..at].char_indices().next_back().map(|(i, _)| i).unwrap_or(0)
}

/// 直後の文字境界
pub fn next_boundary(text: &str, at: usize) -> usize {
    let at = clamp(text, at);
    text[at..]
        .chars()
        .next()
        .map(|c| at + c.len_utf8())
        .unwrap_or(at)
}

/// テキスト長と文字境界に収める
pub fn clamp(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

pub fn line_start(text: &str, at: usize) -> usize {
    let at = clamp(text, at);
    text[..at].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

pub fn line_end(text: &str, at: usize) -> usize {
    let at = clamp(text, at);
    text[at..].find('\n').map(|i| at + i).unwrap_or(text.len())
}

/// 行頭からの文字数
pub fn column(text: &str, at: usize) -> usize {
    let at = clamp(text, at);
    text[line_start(text, at)..at].chars().count()
}

/// 行番号（0始まり）
pub fn line_index(text: &str, at: usize) -> usize {
    let at = clamp(text, at);
    text[..at].matches('\n').count()
}

fn offset_in_line(text: &str, start: usize, column: usize) -> usize {
    let end = line_end(text, start);
    text[start..end]
        .char_indices()
        .nth(column)
        .map(|(i, _)| start + i)
        .unwrap_or(end)
}

/// 上の行の同じ列（行が短ければ行末）
pub fn line_up(text: &str, at: usize) -> usize {
    let start = line_start(text, at);
    if start == 0 {
        return 0;
    }
    let col = column(text, at);
    let prev_start = line_start(text, start - 1);
    offset_in_line(text, prev_start, col)
}

/// 下の行の同じ列（最終行なら末尾）
pub fn line_down(text: &str, at: usize) -> usize {
    let end = line_end(text, at);
    if end >= text.len() {
        return text.len();
    }
    let col = column(text, at);
    offset_in_line(text, end + 1, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_skip_multibyte_chars() {
        let text = "aあb";
        assert_eq!(next_boundary(text, 1), 4);
        assert_eq!(prev_boundary(text, 4), 1);
        assert_eq!(prev_boundary(text, 0), 0);
        assert_eq!(next_boundary(text, text.len()), text.len());
    }

    #[test]
    fn vertical_movement_keeps_column() {
        let text = "hello\nhi\nworld";
        let at = 4; // "hell|o"
        let down = line_down(text, at);
        assert_eq!(down, 8); // "hi|" 行末
        assert_eq!(line_down(text, down), 11); // "wo|rld"
        assert_eq!(line_up(text, 11), 8);
        assert_eq!(line_up(text, 2), 0);
    }

    #[test]
    fn line_helpers() {
        let text = "ab\ncd";
        assert_eq!(line_start(text, 4), 3);
        assert_eq!(line_end(text, 0), 2);
        assert_eq!(column(text, 4), 1);
        assert_eq!(line_index(text, 4), 1);
    }
}
