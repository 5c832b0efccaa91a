//! Turns raw command output into rows.

use tracing::debug;

use crate::config::Mode;
use crate::table::Row;

/// Rows parsed from one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    pub rows: Vec<Row>,
    /// Lines inside the header/footer window that did not yield a row.
    pub skipped: usize,
}

/// Parses `output` according to `mode`.
///
/// Blank lines are ignored and do not count toward `drop_header` or
/// `drop_footer`. Every remaining line is trimmed and matched against the
/// mode's pattern; lines that don't match, or whose capture count differs
/// from the number of fields, are skipped.
pub fn parse_output(mode: &Mode, output: &str) -> ParsedOutput {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let end = lines.len().saturating_sub(mode.drop_footer);
    let body = lines.get(mode.drop_header..end).unwrap_or_default();

    let mut parsed = ParsedOutput::default();
    for line in body {
        match parse_line(mode, line) {
            Some(row) => parsed.rows.push(row),
            None => {
                debug!(mode = %mode.name, line = %line, "skipping unparsable line");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

/// Applies the mode's pattern to one trimmed line.
///
/// Returns `None` if the line does not match or the number of capture
/// groups differs from the number of fields. Groups that did not take part
/// in the match become empty strings.
pub fn parse_line(mode: &Mode, line: &str) -> Option<Row> {
    if mode.group_count() != mode.fields.len() {
        return None;
    }
    let caps = mode.pattern.captures(line)?;
    Some(
        caps.iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect(),
    )
}
