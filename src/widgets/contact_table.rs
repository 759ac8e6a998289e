//! Aligned roster table used by `--show-lists`.

use std::path::Path;

use crate::contacts::ContactRow;
use crate::core::text::width::{display_width, pad_to_width};

fn right_align(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{}{text}", " ".repeat(pad))
}

/// One header line plus one line per row: index, name, number, alias.
pub fn render_contact_table(rows: &[ContactRow]) -> Vec<String> {
    let idx_w = rows.len().to_string().len().max(1);
    let name_w = rows
        .iter()
        .map(|row| display_width(&row.name))
        .max()
        .unwrap_or(0)
        .max(4);
    let num_w = rows
        .iter()
        .map(|row| display_width(&row.handle))
        .max()
        .unwrap_or(0)
        .max(6);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        format!(
            " {}  {}  {}  Alias",
            right_align("#", idx_w),
            pad_to_width("Name", name_w),
            right_align("Number", num_w)
        )
        .trim_end()
        .to_string(),
    );
    for (i, row) in rows.iter().enumerate() {
        let line = format!(
            " {}  {}  {}  {}",
            right_align(&(i + 1).to_string(), idx_w),
            pad_to_width(&row.name, name_w),
            right_align(&row.handle, num_w),
            row.alias
        );
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Caption shown above each file's table.
pub fn source_caption(path: &Path, count: usize) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("List: {name} ({count} contacts)")
}
