use chrono::{DateTime, Utc};
use colored::Colorize;
use savekeep::api::{CmdMessage, DisplaySave, MessageLevel};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const QUICK_MARKER: &str = "⟳";

pub(crate) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

pub(crate) fn print_saves(saves: &[DisplaySave]) {
    if saves.is_empty() {
        println!("No saves found.");
        return;
    }

    for ds in saves {
        let meta = &ds.record.meta;
        let idx_str = format!("{}. ", ds.index);
        let marker = if meta.is_quick() {
            format!("{} ", QUICK_MARKER)
        } else {
            "  ".to_string()
        };

        let label = if meta.scene.is_empty() {
            meta.name.clone()
        } else {
            format!("{}  ({})", meta.name, meta.scene)
        };

        let fixed_width = 2 + marker.width() + idx_str.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let label_display = truncate_to_width(&label, available);
        let padding = available.saturating_sub(label_display.width());

        let idx_colored = if meta.is_quick() {
            idx_str.cyan()
        } else {
            idx_str.normal()
        };

        println!(
            "  {}{}{}{}{}",
            marker.cyan(),
            idx_colored,
            label_display,
            " ".repeat(padding),
            format_time_ago(meta.timestamp).dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp_ms: i64) -> String {
    let created = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_else(Utc::now);
    let duration = Utc::now().signed_duration_since(created);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("a long label", 6), "a lon…");
    }

    #[test]
    fn future_timestamps_do_not_panic() {
        let future = Utc::now().timestamp_millis() + 60_000;
        assert_eq!(format_time_ago(future).trim(), "now");
    }
}
