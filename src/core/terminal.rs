//! Terminal trait and raw-mode scoping.

use std::io;
use std::ops::{Deref, DerefMut};

/// The slice of terminal behavior the preview needs.
pub trait Terminal {
    /// Switch input to raw, no-echo mode.
    fn enable_raw_mode(&mut self) -> io::Result<()>;

    /// Restore the input mode captured by `enable_raw_mode`. No-op if raw mode is off.
    fn restore_mode(&mut self) -> io::Result<()>;

    /// Block until one byte arrives. `None` means the input stream closed.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write output to the terminal.
    fn write(&mut self, data: &str) -> io::Result<()>;

    /// Terminal width in columns; implementations fall back to 80.
    fn columns(&self) -> u16;
}

/// RAII guard that holds the terminal in raw mode and restores it on drop.
pub struct RawModeGuard<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
    active: bool,
}

impl<'a, T: Terminal + ?Sized> RawModeGuard<'a, T> {
    pub fn acquire(terminal: &'a mut T) -> io::Result<Self> {
        terminal.enable_raw_mode()?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Like `acquire`, but falls back to the current mode (e.g. input is a pipe).
    pub fn acquire_or_passthrough(terminal: &'a mut T) -> Self {
        let active = match terminal.enable_raw_mode() {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "raw mode unavailable; reading input as-is");
                false
            }
        };
        Self { terminal, active }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl<T: Terminal + ?Sized> Deref for RawModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> DerefMut for RawModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(err) = self.terminal.restore_mode() {
            tracing::warn!(error = %err, "failed to restore terminal mode");
        }
    }
}
