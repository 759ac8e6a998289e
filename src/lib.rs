//! fimg: send a message to contacts resolved from local CSV rosters.
//!
//! Invariant: resolution never fails. Every target item yields a recipient,
//! falling back to the literal text when no roster entry matches.
//!
//! # Public API Overview
//! - Resolve target text with [`resolve`] against a [`ContactIndex`] from [`build_index`].
//! - Preview and confirm with [`preview_and_confirm`] on any [`Terminal`].
//! - Drive a whole send with [`run_send`] and a [`delivery::Deliver`] implementation.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub mod contacts;
pub mod core;
pub mod platform;
pub mod send;
pub mod widgets;

/// Roster loading, indexing, and resolution.
pub use crate::contacts::{
    build_index, build_index_for, classify, for_each_row, list_sources, load_rows, resolve,
    resolve_in, roster_names, select_sources, split_items, ContactIndex, ContactRow, FileOrder,
    IndexEntry, MatchSource, ResolvedTarget, TargetItem, ALL_CONTACTS,
};

/// Invocation parsing.
pub use crate::cli::{decode_message, parse_invocation, Cli, Invocation};

pub use crate::config::EnvConfig;
pub use crate::error::{FimgError, USAGE};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::{RawModeGuard, Terminal};
pub use crate::platform::process_terminal::ProcessTerminal;

/// Preview rendering and the send loop.
pub use crate::send::{deliver_all, run_send, SendOutcome, SendReport, SendRequest};
pub use crate::widgets::{preview_and_confirm, render_preview, PreviewOptions};

/// Visible width helper used for box sizing.
pub use crate::core::text::width::display_width;
