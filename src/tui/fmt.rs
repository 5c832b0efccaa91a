//! Fixed-width column formatting.

use crate::config::Field;

/// Left-justifies `value` in exactly `width` characters, truncating without
/// an ellipsis when it is longer.
pub fn fit_width(value: &str, width: usize) -> String {
    let mut out: String = value.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Formats the visible cells of one line. Every column is preceded by a
/// single space; hidden fields are left out entirely.
pub fn format_cells<S: AsRef<str>>(fields: &[Field], values: &[S]) -> String {
    let mut line = String::new();
    for (field, value) in fields.iter().zip(values) {
        if field.hidden {
            continue;
        }
        line.push(' ');
        line.push_str(&fit_width(value.as_ref(), field.width()));
    }
    line
}

/// Header line built from the visible field names.
pub fn format_header(fields: &[Field]) -> String {
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    format_cells(fields, &names)
}
