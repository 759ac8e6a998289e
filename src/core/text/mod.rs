//! Text helpers (display width, truncation, padding).
//!
//! These helpers are pure (string in/string out).

pub mod width;
