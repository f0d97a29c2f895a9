/// Approximate rendered width of one character.
pub const CHAR_WIDTH_PX: f64 = 16.0;
pub const MIN_CHARS_PER_LINE: usize = 1;
pub const MAX_TEXT_LINES: usize = 3;

/// Characters that fit on one line of a box `width` pixels wide.
pub(super) fn chars_per_line(width: i32) -> usize {
    ((width as f64 / CHAR_WIDTH_PX) as usize).max(MIN_CHARS_PER_LINE)
}

/// Wraps `text` at word boundaries, keeping explicit newlines.
///
/// Output is capped at `max_lines` (3 when zero); a cut-off last line ends in
/// `...` when there is room for it.
pub fn wrap_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_lines = if max_lines == 0 {
        MAX_TEXT_LINES
    } else {
        max_lines
    };

    let mut lines = Vec::new();
    for line in text.split('\n').map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if char_len(line) <= max_chars {
            lines.push(line.to_string());
        } else {
            lines.extend(wrap_line(line, max_chars));
        }
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let len = char_len(last);
            if max_chars > 3 && len > max_chars - 3 {
                *last = format!("{}...", take_chars(last, max_chars - 3));
            } else if max_chars > 0 && len > max_chars {
                *last = take_chars(last, max_chars).to_string();
            }
        }
    }
    lines
}

fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(MIN_CHARS_PER_LINE);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if char_len(word) > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            let mut chunks: Vec<String> = chars
                .chunks(max_chars)
                .map(|chunk| chunk.iter().collect())
                .collect();
            // The tail of a split word may still take more words.
            current = chunks.pop().unwrap_or_default();
            lines.extend(chunks);
            continue;
        }

        let extra = if current.is_empty() { 0 } else { 1 };
        if char_len(&current) + extra + char_len(word) <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
