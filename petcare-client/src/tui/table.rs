use ratatui::crossterm;

use crate::util::format::{bold, grey};

/// Narrowest a column is squeezed to when the terminal is too small.
const MIN_COL_WIDTH: usize = 4;
const GAP: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Column {
    pub title: String,
    pub align: Align,
}

impl Column {
    pub fn left(title: &str) -> Self {
        Self {
            title: title.to_string(),
            align: Align::Left,
        }
    }

    pub fn right(title: &str) -> Self {
        Self {
            title: title.to_string(),
            align: Align::Right,
        }
    }
}

pub fn terminal_width() -> Option<usize> {
    match crossterm::terminal::size() {
        Ok((w, _h)) if w > 0 => Some(w as usize),
        _ => None,
    }
}

/// Truncate a string to max length, adding "…" if truncated
fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    format!("{}…", s.chars().take(max - 1).collect::<String>())
}

fn pad(s: &str, width: usize, align: Align) -> String {
    let t = truncate_str(s, width);
    let fill = " ".repeat(width.saturating_sub(t.chars().count()));
    match align {
        Align::Left => format!("{t}{fill}"),
        Align::Right => format!("{fill}{t}"),
    }
}

/// Shrinks the widest column until the row fits `max_width`.
fn fit_widths(widths: &mut [usize], max_width: usize) {
    let total = |w: &[usize]| w.iter().sum::<usize>() + GAP.len() * w.len().saturating_sub(1);
    while total(widths) > max_width {
        let Some((idx, widest)) = widths
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, w)| *w)
        else {
            return;
        };
        if widest <= MIN_COL_WIDTH {
            return;
        }
        widths[idx] = widest - 1;
    }
}

/// Plain text table: bold header, a rule, one line per row.
/// Rows shorter than `columns` are padded with empty cells.
pub fn render_table(columns: &[Column], rows: &[Vec<String>], max_width: Option<usize>) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.title.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    if let Some(max) = max_width {
        fit_widths(&mut widths, max);
    }

    let header = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad(&c.title, *w, c.align))
        .collect::<Vec<_>>()
        .join(GAP);

    let rule_width = widths.iter().sum::<usize>() + GAP.len() * widths.len().saturating_sub(1);

    let mut out = String::new();
    out.push_str(&bold(header.trim_end()));
    out.push('\n');
    out.push_str(&grey(&"─".repeat(rule_width)));
    out.push('\n');

    for row in rows {
        let line = columns
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (c, w))| pad(row.get(i).map(String::as_str).unwrap_or(""), *w, c.align))
            .collect::<Vec<_>>()
            .join(GAP);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
