//! Terminal output widgets.

pub mod contact_table;
pub mod preview;

pub use contact_table::{render_contact_table, source_caption};
pub use preview::{preview_and_confirm, render_preview, PreviewOptions};
