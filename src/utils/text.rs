use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cuts `text` to `max_width` display columns, ending in `...` when cut.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    if max_width <= ELLIPSIS.len() {
        return ELLIPSIS[..max_width].to_string();
    }

    let budget = max_width - ELLIPSIS.len();
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(ELLIPSIS);
    out
}

pub fn pad_to_width(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - text_width))
    }
}

/// Widest display width among `labels`.
pub fn label_width<'a>(labels: impl IntoIterator<Item = &'a str>) -> usize {
    labels.into_iter().map(UnicodeWidthStr::width).max().unwrap_or(0)
}
