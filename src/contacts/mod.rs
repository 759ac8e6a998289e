//! Roster loading, indexing, and target resolution.

pub mod index;
pub mod resolve;
pub mod rows;

pub use index::{
    build_index, build_index_for, list_sources, load_rows, roster_names, select_sources,
    ContactIndex, FileOrder, IndexEntry,
};
pub use resolve::{
    classify, resolve, resolve_in, split_items, MatchSource, ResolvedTarget, TargetItem,
    ALL_CONTACTS,
};
pub use rows::{for_each_row, read_rows, ContactRow};
