//! Roster file scanning.
//!
//! Files hold `name,number,alias` rows. Only the first two commas split, so an
//! alias may itself contain commas. Missing or unreadable files yield no rows.

use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub name: String,
    pub handle: String,
    pub alias: String,
}

impl ContactRow {
    pub fn new(name: impl Into<String>, handle: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            alias: alias.into(),
        }
    }
}

/// Calls `on_row(name, number, alias)` for every data line in `file`.
pub fn for_each_row<F>(file: &Path, mut on_row: F)
where
    F: FnMut(&str, &str, &str),
{
    let bytes = match fs::read(file) {
        Ok(bytes) => bytes,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %file.display(), error = %err, "skipping unreadable roster file");
            }
            return;
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut first_data_line = true;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (name, number, alias) = split_row(line);
        if first_data_line {
            first_data_line = false;
            if is_header(name, number) {
                continue;
            }
        }
        on_row(name, number, alias);
    }
}

/// Collects every row of `file`, keeping only rows with a name.
pub fn read_rows(file: &Path) -> Vec<ContactRow> {
    let mut rows = Vec::new();
    for_each_row(file, |name, number, alias| {
        if !name.is_empty() {
            rows.push(ContactRow::new(name, number, alias));
        }
    });
    rows
}

fn split_row(line: &str) -> (&str, &str, &str) {
    let mut fields = line.splitn(3, ',');
    let name = fields.next().unwrap_or("").trim();
    let number = fields.next().unwrap_or("").trim();
    let alias = fields.next().unwrap_or("").trim();
    (name, number, alias)
}

fn is_header(name: &str, number: &str) -> bool {
    name.eq_ignore_ascii_case("name") && number.eq_ignore_ascii_case("number")
}
