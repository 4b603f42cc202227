//! Headings, wrapped narrative paragraphs and the session footer.

use chrono::{DateTime, Utc};
use console::style;

/// A section heading underlined to its own width.
#[must_use]
pub fn heading(title: &str) -> String {
    let rule = "═".repeat(title.chars().count());
    format!("\n{}\n{}\n", style(title).bold().cyan(), style(rule).cyan())
}

/// Greedy word wrap. Blank lines separate paragraphs and are kept.
#[must_use]
pub fn wrap(text: &str, width: usize) -> String {
    let mut out = String::new();

    for (i, paragraph) in text.trim().split("\n\n").enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let len = word.chars().count();
            if line_len > 0 && line_len + 1 + len > width {
                out.push('\n');
                line_len = 0;
            }
            if line_len > 0 {
                out.push(' ');
                line_len += 1;
            }
            out.push_str(word);
            line_len += len;
        }
        out.push('\n');
    }

    out
}

/// Attribution line for a dataset, with its portal link when known.
#[must_use]
pub fn attribution(text: &str, url: Option<&str>) -> String {
    match url {
        Some(url) => format!("{} ({url})", style(text).dim()),
        None => style(text).dim().to_string(),
    }
}

/// The closing line of a report: which binary produced it and when.
#[must_use]
pub fn session_footer(name: &str, version: &str, generated_at: DateTime<Utc>) -> String {
    style(format!(
        "Generated by {name} {version} at {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ))
    .dim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use console::strip_ansi_codes;

    use super::*;

    #[test]
    fn wraps_at_word_boundaries() {
        let text = "Shootings peak late at night and on weekends.";
        let wrapped = wrap(text, 20);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert_eq!(
            lines,
            vec!["Shootings peak late", "at night and on", "weekends."]
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn keeps_paragraph_breaks() {
        let wrapped = wrap("First paragraph.\n\nSecond\nparagraph.", 40);
        assert_eq!(wrapped, "First paragraph.\n\nSecond paragraph.\n");
    }

    #[test]
    fn long_words_are_not_split() {
        let wrapped = wrap("a supercalifragilistic b", 5);
        assert_eq!(wrapped, "a\nsupercalifragilistic\nb\n");
    }

    #[test]
    fn footer_names_the_binary_and_time() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let footer = session_footer("data_reports", "0.1.0", at);
        assert_eq!(
            strip_ansi_codes(&footer),
            "Generated by data_reports 0.1.0 at 2024-05-01 12:30:00 UTC"
        );
    }

    #[test]
    fn attribution_links_the_portal() {
        let line = attribution("Source: NYC OpenData", Some("https://data.cityofnewyork.us"));
        assert_eq!(
            strip_ansi_codes(&line),
            "Source: NYC OpenData (https://data.cityofnewyork.us)"
        );
        assert_eq!(strip_ansi_codes(&attribution("Source: JHU", None)), "Source: JHU");
    }

    #[test]
    fn heading_is_underlined() {
        let plain = strip_ansi_codes(&heading("Borough")).into_owned();
        assert_eq!(plain, "\nBorough\n═══════\n");
    }
}
