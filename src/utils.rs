use chrono::{DateTime, Local};
use percent_encoding::percent_decode_str;
use std::fs::OpenOptions;
use std::io::Write;
use unicode_width::UnicodeWidthChar;

pub fn log_msg(level: &str, msg: &str) {
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open("tokmark.log")
    {
        let now: DateTime<Local> = Local::now();
        let _ = writeln!(
            file,
            "time=\"{time}\" level={level} msg=\"{msg}\"",
            time = now.format("%Y-%m-%dT%H:%M:%S%z"),
        );
    }
}

pub fn decode_url(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().to_string()
}

/// Cuts `text` to at most `max` terminal columns, appending an ellipsis when
/// anything was dropped.
pub fn truncate_width(text: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_wide_characters_by_display_width() {
        assert_eq!(truncate_width("abcdef", 10), "abcdef");
        assert_eq!(truncate_width("abcdef", 4), "abc…");
        // Each hangul syllable is two columns wide.
        assert_eq!(truncate_width("한국어", 5), "한국…");
    }
}
