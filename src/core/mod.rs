//! Core terminal and text primitives.

pub mod terminal;
pub mod text;
