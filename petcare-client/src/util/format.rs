use std::sync::OnceLock;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GREY: &str = "\x1b[90m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const PINK: &str = "\x1b[38;2;255;29;94m";

static USE_COLOR: OnceLock<bool> = OnceLock::new();

/// Fixes console styling for the rest of the process. Later calls are ignored.
pub fn init_styling(no_color: bool) {
    let enabled = !no_color && std::env::var_os("NO_COLOR").is_none();
    let _ = USE_COLOR.set(enabled);
}

fn use_color() -> bool {
    *USE_COLOR.get().unwrap_or(&false)
}

fn paint(code: &str, s: &str) -> String {
    if use_color() {
        format!("{code}{s}{RESET}")
    } else {
        s.to_string()
    }
}

pub fn bold(s: &str) -> String {
    paint(BOLD, s)
}

pub fn grey(s: &str) -> String {
    paint(GREY, s)
}

pub fn red(s: &str) -> String {
    paint(RED, s)
}

pub fn green(s: &str) -> String {
    paint(GREEN, s)
}

pub fn yellow(s: &str) -> String {
    paint(YELLOW, s)
}

pub fn accent(s: &str) -> String {
    paint(PINK, s)
}

/// Horizontal rule with an optional centered title.
pub fn rule(title: Option<&str>, width: usize) -> String {
    let line = match title {
        Some(title) => {
            let title_w = title.chars().count() + 2;
            let side = width.saturating_sub(title_w) / 2;
            let rest = width.saturating_sub(title_w + side);
            format!("{} {} {}", "─".repeat(side), title, "─".repeat(rest))
        }
        None => "─".repeat(width),
    };
    accent(&line)
}

/// Human friendly duration for a number of seconds, e.g. `45sec`, `12min`, `3h 5m`, `2d 1h 0m`.
pub fn natural_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if seconds >= 86_400 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if seconds >= 3600 {
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    } else if seconds >= 60 {
        format!("{}min", minutes)
    } else {
        format!("{}sec", seconds)
    }
}

/// Mass delta as shown in the pets table.
pub fn grams(value: f64) -> String {
    format!("{}g", value)
}
