//! Line-oriented edits of the `---` delimited front matter block.
//!
//! Nothing here parses YAML. A block is the run of lines between an opening
//! `---` on the first line and the next `---` line; a field is any line of the
//! form `key: value` inside it.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

/// `2024-01-02 10:00 +0000`
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M %z";
/// Prefix of published file names.
pub(crate) const DATE_PREFIX_FORMAT: &str = "%Y-%m-%d";

const DELIMITER: &str = "---";

static FIELD_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^:\s]+):").unwrap());

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum FrontMatterError {
    #[error("does not start with front matter (expected a `---` first line)")]
    MissingOpening,
    #[error("is missing the closing front matter delimiter (`---`)")]
    MissingClosing,
}

pub(crate) fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn date_prefix(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format(DATE_PREFIX_FORMAT).to_string()
}

fn is_delimiter(line: &str) -> bool {
    line.trim() == DELIMITER
}

fn field_key(line: &str) -> Option<&str> {
    FIELD_KEY
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Splits a line into its content and its own terminator (`\r\n`, `\n` or none).
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Sets the `date` field of the front matter in `text` to `timestamp`.
///
/// The first `date:` line of the block is replaced whole. Without one, a new
/// line goes right after the first `title:` line, or first in the block when
/// there is no title either, ending the way the line before it ends. Every
/// other line is kept byte for byte, terminator included.
pub(crate) fn stamp_date(
    text: &str,
    timestamp: &DateTime<FixedOffset>,
) -> Result<String, FrontMatterError> {
    let date_line = format!("date: {}", format_timestamp(timestamp));

    let mut lines: Vec<(&str, &str)> = text.split_inclusive('\n').map(split_terminator).collect();
    if !lines.first().is_some_and(|(l, _)| is_delimiter(l)) {
        return Err(FrontMatterError::MissingOpening);
    }
    let closing = lines
        .iter()
        .skip(1)
        .position(|(l, _)| is_delimiter(l))
        .map(|i| i + 1)
        .ok_or(FrontMatterError::MissingClosing)?;

    let find = |lines: &[(&str, &str)], key: &str| {
        (1..closing).find(|&i| field_key(lines[i].0) == Some(key))
    };
    if let Some(i) = find(&lines, "date") {
        lines[i].0 = &date_line;
    } else {
        let at = find(&lines, "title").map_or(1, |i| i + 1);
        // the preceding line is followed by the closing delimiter, so it has a terminator
        let terminator = lines[at - 1].1;
        lines.insert(at, (&date_line, terminator));
    }

    Ok(lines.iter().flat_map(|(line, end)| [*line, *end]).collect())
}

/// Front matter written for a freshly created post: quoted title, date, blank line.
pub(crate) fn stub(title: &str, timestamp: &DateTime<FixedOffset>) -> String {
    let escaped = title.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "---\ntitle: \"{escaped}\"\ndate: {}\n---\n\n",
        format_timestamp(timestamp)
    )
}
