//! Case-insensitive contact index built from a roster directory.
//!
//! Invariant: the index is a plain value. It is rebuilt for every resolution
//! and never cached, so it always reflects the files on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::rows::{for_each_row, read_rows, ContactRow};

const ROSTER_EXTENSION: &str = "csv";

/// Order in which roster files are applied. Later files win key collisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileOrder {
    #[default]
    Lexicographic,
    ReverseLexicographic,
}

impl FileOrder {
    /// Parses `FIMG_FILE_ORDER` style values; unknown values keep the default.
    pub fn from_config(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "reverse" | "reverse-lexicographic" | "desc" => Self::ReverseLexicographic,
            _ => Self::Lexicographic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub handle: String,
}

#[derive(Debug, Default, Clone)]
pub struct ContactIndex {
    entries: BTreeMap<String, IndexEntry>,
    /// Every inserted row, in roster order.
    contacts: Vec<IndexEntry>,
}

impl ContactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `row` under its full name, first token, last token, and alias.
    pub fn insert_row(&mut self, name: &str, handle: &str, alias: &str) {
        if name.is_empty() {
            return;
        }

        let entry = IndexEntry {
            name: name.to_string(),
            handle: handle.to_string(),
        };
        for key in index_keys(name, alias) {
            self.entries.insert(key, entry.clone());
        }
        self.contacts.push(entry);
    }

    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    /// First entry, in sorted key order, whose key contains `needle`.
    pub fn find_substring(&self, needle: &str) -> Option<(&str, &IndexEntry)> {
        self.entries
            .iter()
            .find(|(key, _)| key.contains(needle))
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn contacts(&self) -> &[IndexEntry] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn index_keys(name: &str, alias: &str) -> Vec<String> {
    let full = name.to_lowercase();
    let mut tokens = full.split_whitespace();
    let first = tokens.next().unwrap_or("").to_string();
    let last = full.split_whitespace().last().unwrap_or("").to_string();
    let alias = alias.to_lowercase();

    [full, first, last, alias]
        .into_iter()
        .filter(|key| !key.is_empty())
        .collect()
}

/// Roster files directly inside `directory`, in application order.
pub fn list_sources(directory: &Path, order: FileOrder) -> Vec<PathBuf> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %directory.display(), error = %err, "cannot list roster directory");
            }
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_roster_file(path))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if order == FileOrder::ReverseLexicographic {
        files.reverse();
    }
    files
}

fn is_roster_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ROSTER_EXTENSION))
}

/// Lower-cased file stems of the roster files in `directory`.
pub fn roster_names(directory: &Path) -> Vec<String> {
    list_sources(directory, FileOrder::Lexicographic)
        .iter()
        .filter_map(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .collect()
}

/// Roster files in application order, limited to the roster named `list` when given.
pub fn select_sources(directory: &Path, order: FileOrder, list: Option<&str>) -> Vec<PathBuf> {
    let files = list_sources(directory, order);
    let Some(list) = list else {
        return files;
    };
    files
        .into_iter()
        .filter(|path| {
            path.file_stem()
                .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(list))
        })
        .collect()
}

pub fn build_index(directory: &Path, order: FileOrder) -> ContactIndex {
    build_index_for(directory, order, None)
}

/// Like [`build_index`], but only from the roster named `list` when given.
pub fn build_index_for(directory: &Path, order: FileOrder, list: Option<&str>) -> ContactIndex {
    let mut index = ContactIndex::new();
    for file in select_sources(directory, order, list) {
        for_each_row(&file, |name, number, alias| {
            index.insert_row(name, number, alias);
        });
    }
    tracing::debug!(
        path = %directory.display(),
        list = list.unwrap_or("*"),
        keys = index.len(),
        contacts = index.contacts().len(),
        "built contact index"
    );
    index
}

/// Every named row from every roster file, grouped by file.
pub fn load_rows(directory: &Path, order: FileOrder) -> Vec<(PathBuf, Vec<ContactRow>)> {
    list_sources(directory, order)
        .into_iter()
        .map(|file| {
            let rows = read_rows(&file);
            (file, rows)
        })
        .collect()
}
