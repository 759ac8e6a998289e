//! Message preview box and single-key confirmation.

use std::io;

use crate::core::terminal::{RawModeGuard, Terminal};
use crate::core::text::width::{display_width, pad_to_width, truncate_to_width};

pub const PREVIEW_TITLE: &str = "Message preview:";
pub const CONFIRM_PROMPT: &str = "Press Enter to send; any other key to cancel... ";
const EMPTY_MESSAGE: &str = "(empty)";

#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewOptions {
    /// Render, then accept without reading a key (batch mode).
    pub skip_confirmation: bool,
}

/// Lines of the bordered preview followed by the recipient summary.
///
/// The inner width is the widest of the title and message lines plus one
/// space of padding per side, clamped so the whole box fits in `columns`.
pub fn render_preview(message: &str, recipients: &[String], columns: u16) -> Vec<String> {
    let mut body: Vec<&str> = message.lines().collect();
    if body.iter().all(|line| line.trim().is_empty()) {
        body = vec![EMPTY_MESSAGE];
    }

    let content_width = body
        .iter()
        .map(|line| display_width(line))
        .chain(std::iter::once(display_width(PREVIEW_TITLE)))
        .max()
        .unwrap_or(0);
    let max_inner = usize::from(columns).saturating_sub(2).max(3);
    let inner = (content_width + 2).min(max_inner);
    let text_width = inner - 2;

    let row = |text: &str| {
        let fitted = truncate_to_width(text, text_width, "…");
        format!("│ {} │", pad_to_width(&fitted, text_width))
    };

    let mut lines = Vec::with_capacity(body.len() + 6);
    lines.push(format!("┌{}┐", "─".repeat(inner)));
    lines.push(row(PREVIEW_TITLE));
    for line in body {
        lines.push(row(line));
    }
    lines.push(format!("└{}┘", "─".repeat(inner)));
    lines.push(String::new());
    lines.push("send to:".to_string());
    lines.push(recipients.join(" "));
    lines
}

/// Shows the preview and waits for one key. Only Enter (CR or LF) accepts.
///
/// Raw mode is held only for the single read and is released on every path.
/// When the input is not a terminal, one byte is read as-is; EOF declines.
pub fn preview_and_confirm<T: Terminal + ?Sized>(
    terminal: &mut T,
    message: &str,
    recipients: &[String],
    options: PreviewOptions,
) -> io::Result<bool> {
    let mut out = String::from("\n");
    for line in render_preview(message, recipients, terminal.columns()) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');

    if options.skip_confirmation {
        terminal.write(&out)?;
        return Ok(true);
    }

    out.push_str(CONFIRM_PROMPT);
    terminal.write(&out)?;

    let key = {
        let mut guard = RawModeGuard::acquire_or_passthrough(&mut *terminal);
        guard.read_byte()?
    };
    terminal.write("\n")?;

    Ok(is_accept_key(key))
}

fn is_accept_key(key: Option<u8>) -> bool {
    matches!(key, Some(b'\r') | Some(b'\n'))
}
