//! Target resolution: comma-separated user text to deduplicated recipients.
//!
//! Resolution never fails. An item that matches nothing is echoed back as
//! both display name and handle, so bad roster data never blocks a send.

use std::collections::HashSet;
use std::path::Path;

use super::index::{build_index, ContactIndex, FileOrder, IndexEntry};

/// Name query that expands to every contact in the index.
pub const ALL_CONTACTS: &str = "all";

/// How a target item should be treated before any lookup happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetItem<'a> {
    /// Contains `@` or a numeric character in any script; used verbatim.
    Handle(&'a str),
    NameQuery(&'a str),
}

pub fn classify(item: &str) -> TargetItem<'_> {
    if item.contains('@') || item.chars().any(char::is_numeric) {
        TargetItem::Handle(item)
    } else {
        TargetItem::NameQuery(item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Handle,
    Exact,
    /// Expanded from the `all` query.
    Everyone,
    Substring,
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub display_name: String,
    pub handle: String,
    pub source: MatchSource,
}

impl ResolvedTarget {
    fn literal(item: &str, source: MatchSource) -> Self {
        Self {
            display_name: item.to_string(),
            handle: item.to_string(),
            source,
        }
    }

    fn from_entry(entry: &IndexEntry, source: MatchSource) -> Self {
        let handle = if entry.handle.is_empty() {
            entry.name.clone()
        } else {
            entry.handle.clone()
        };
        Self {
            display_name: entry.name.clone(),
            handle,
            source,
        }
    }

    /// Whether the index supplied this target.
    pub fn is_indexed(&self) -> bool {
        matches!(
            self.source,
            MatchSource::Exact | MatchSource::Everyone | MatchSource::Substring
        )
    }
}

/// Splits on commas, trims whitespace and surrounding quotes, drops empties.
pub fn split_items(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(|piece| piece.trim().trim_matches(['"', '\'']).trim())
        .filter(|piece| !piece.is_empty())
        .collect()
}

pub fn resolve(input: &str, index: &ContactIndex) -> Vec<ResolvedTarget> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for item in split_items(input) {
        for target in resolve_item(item, index) {
            tracing::debug!(
                item,
                handle = %target.handle,
                source = ?target.source,
                "resolved target"
            );
            if seen.insert(target.handle.to_lowercase()) {
                resolved.push(target);
            }
        }
    }

    resolved
}

/// Builds a fresh index from `directory`, resolves `input`, and drops the index.
pub fn resolve_in(directory: &Path, input: &str, order: FileOrder) -> Vec<ResolvedTarget> {
    let index = build_index(directory, order);
    resolve(input, &index)
}

/// Exact key, then `all`, then the first substring hit, then the literal text.
fn resolve_item(item: &str, index: &ContactIndex) -> Vec<ResolvedTarget> {
    let query = match classify(item) {
        TargetItem::Handle(handle) => {
            return vec![ResolvedTarget::literal(handle, MatchSource::Handle)]
        }
        TargetItem::NameQuery(query) => query,
    };

    let key = query.to_lowercase();
    if let Some(entry) = index.get(&key) {
        return vec![ResolvedTarget::from_entry(entry, MatchSource::Exact)];
    }
    if key == ALL_CONTACTS && !index.contacts().is_empty() {
        return index
            .contacts()
            .iter()
            .map(|entry| ResolvedTarget::from_entry(entry, MatchSource::Everyone))
            .collect();
    }
    match index.find_substring(&key) {
        Some((_, entry)) => vec![ResolvedTarget::from_entry(entry, MatchSource::Substring)],
        None => vec![ResolvedTarget::literal(query, MatchSource::Literal)],
    }
}
