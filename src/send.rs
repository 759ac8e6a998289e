//! Resolve → preview → deliver, one recipient at a time.

use std::path::Path;

use delivery::Deliver;

use crate::contacts::{build_index_for, resolve, FileOrder, MatchSource, ResolvedTarget};
use crate::core::terminal::Terminal;
use crate::error::{FimgError, Result};
use crate::widgets::preview::{preview_and_confirm, PreviewOptions};

const CHECK: &str = "✔";
const CROSS: &str = "✖";

#[derive(Debug, Clone)]
pub struct SendRequest<'a> {
    pub targets: &'a str,
    pub message: &'a str,
    pub lists_dir: &'a Path,
    /// Restrict resolution to one roster, by file stem.
    pub list: Option<&'a str>,
    pub file_order: FileOrder,
    pub preview: PreviewOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    pub sent: usize,
    /// Display names of recipients whose delivery failed, in send order.
    pub failed: Vec<String>,
}

impl SendReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Cancelled,
    Delivered(SendReport),
}

pub fn run_send<T, D>(terminal: &mut T, deliverer: &D, request: &SendRequest<'_>) -> Result<SendOutcome>
where
    T: Terminal + ?Sized,
    D: Deliver + ?Sized,
{
    let index = build_index_for(request.lists_dir, request.file_order, request.list);
    let resolved = resolve(request.targets, &index);
    drop(index);
    if resolved.is_empty() {
        return Err(FimgError::NoRecipients);
    }

    let unmatched: Vec<&str> = resolved
        .iter()
        .filter(|t| t.source == MatchSource::Literal)
        .map(|t| t.handle.as_str())
        .collect();
    if !unmatched.is_empty() {
        tracing::info!(items = ?unmatched, "no roster match; sending to the literal text");
        terminal
            .write(&format!("Unmatched (sent as typed): {}\n", unmatched.join(", ")))
            .map_err(FimgError::Terminal)?;
    }

    let names: Vec<String> = resolved.iter().map(|t| t.display_name.clone()).collect();
    let accepted = preview_and_confirm(terminal, request.message, &names, request.preview)
        .map_err(FimgError::Terminal)?;
    if !accepted {
        terminal
            .write("[fimg] cancelled\n")
            .map_err(FimgError::Terminal)?;
        return Ok(SendOutcome::Cancelled);
    }

    let report = deliver_all(terminal, deliverer, &resolved, request.message)?;
    Ok(SendOutcome::Delivered(report))
}

/// Delivers in resolved order; failures are reported and the loop continues.
pub fn deliver_all<T, D>(
    terminal: &mut T,
    deliverer: &D,
    targets: &[ResolvedTarget],
    message: &str,
) -> Result<SendReport>
where
    T: Terminal + ?Sized,
    D: Deliver + ?Sized,
{
    let mut report = SendReport::default();
    terminal.write("Sending…\n").map_err(FimgError::Terminal)?;

    for target in targets {
        let line = match deliverer.deliver(&target.handle, message) {
            Ok(status) => {
                report.sent += 1;
                format!("{CHECK} {} [{}]\n", target.display_name, status.detail)
            }
            Err(err) => {
                tracing::warn!(handle = %target.handle, error = %err, "delivery failed");
                report.failed.push(target.display_name.clone());
                format!("{CROSS} {} [{}]\n", target.display_name, err.detail())
            }
        };
        terminal.write(&line).map_err(FimgError::Terminal)?;
    }

    let summary = if report.is_success() {
        "All sent.\n".to_string()
    } else {
        format!("Done with {} error(s).\n", report.failed.len())
    };
    terminal.write(&summary).map_err(FimgError::Terminal)?;
    Ok(report)
}
