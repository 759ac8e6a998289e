//! Command-line surface: `fimg [OPTIONS] [LIST] [to] <targets> : <message>`.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{FimgError, Result};

const LEGACY_SKIP_FLAG: &str = "-skip";

#[derive(Debug, Parser)]
#[command(
    name = "fimg",
    version,
    about = "Send a message to contacts resolved from local CSV rosters",
    override_usage = "fimg [OPTIONS] [LIST] [to] <TARGETS> : <MESSAGE>"
)]
pub struct Cli {
    /// Send without waiting for the Enter confirmation
    #[arg(short = 'y', long = "skip")]
    pub skip: bool,

    /// Resolve and preview, but do not deliver anything
    #[arg(long)]
    pub dry_run: bool,

    /// Roster directory (defaults to $FIMG_LISTS_DIR, then ~/fimg/lists)
    #[arg(long, value_name = "DIR")]
    pub lists_dir: Option<PathBuf>,

    /// Print every roster file as a table and exit
    #[arg(long)]
    pub show_lists: bool,

    /// Targets and message, e.g. `to bob, +15551234567 : see you at 8`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "WORDS")]
    pub words: Vec<String>,
}

impl Cli {
    /// Parses `args` (including the program name), honoring the legacy `-skip` spelling.
    pub fn parse_args<I>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        let (legacy_skip, args) = strip_legacy_skip(args.into_iter().collect());
        let mut cli = Self::try_parse_from(args)?;
        cli.skip |= legacy_skip;
        Ok(cli)
    }

    /// Splits off a leading roster name and joins the remaining words.
    ///
    /// `fimg family to ada : hi` limits resolution to `family.csv` when that
    /// roster exists. The first word only selects a roster when more words follow
    /// and it is not part of the message.
    pub fn raw_invocation(&self, rosters: &[String]) -> (Option<&str>, String) {
        match self.words.split_first() {
            Some((first, rest))
                if !rest.is_empty()
                    && !first.contains(':')
                    && rosters.iter().any(|name| name.eq_ignore_ascii_case(first)) =>
            {
                (Some(first.as_str()), rest.join(" "))
            }
            _ => (None, self.words.join(" ")),
        }
    }
}

/// Removes `-skip` tokens that appear before the message separator.
fn strip_legacy_skip(args: Vec<String>) -> (bool, Vec<String>) {
    let mut skip = false;
    let mut in_message = false;
    let mut cleaned = Vec::with_capacity(args.len());
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 && !in_message && arg == LEGACY_SKIP_FLAG {
            skip = true;
            continue;
        }
        if i > 0 && arg.contains(':') {
            in_message = true;
        }
        cleaned.push(arg);
    }
    (skip, cleaned)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub targets: String,
    pub message: String,
}

/// Splits `raw` into the targets string and the decoded message.
///
/// The split happens at the first `:` not preceded by a backslash. A missing
/// separator or an empty target list is a usage error; an empty message is not.
pub fn parse_invocation(raw: &str) -> Result<Invocation> {
    let raw = raw.trim();
    let raw = strip_to_prefix(raw);

    let split_at = find_separator(raw).ok_or(FimgError::Usage)?;
    let targets = raw[..split_at].replace("\\:", ":");
    let targets = targets.trim().trim_matches(['"', '\'']).trim().to_string();
    if targets.is_empty() {
        return Err(FimgError::Usage);
    }
    let message = decode_message(&raw[split_at + 1..]);

    Ok(Invocation { targets, message })
}

fn strip_to_prefix(raw: &str) -> &str {
    match raw.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("to ") => raw[3..].trim_start(),
        _ => raw,
    }
}

fn find_separator(raw: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in raw.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            ':' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

/// Break markers, longest first: `##`/`||` are one line break, doubled they are two.
const BREAK_MARKERS: [(&str, &str); 7] = [
    ("########", "\n\n"),
    ("####", "\n\n"),
    ("##", "\n"),
    ("||||", "\n\n"),
    ("||", "\n"),
    ("\\\\n", "\n"),
    ("\\n", "\n"),
];

/// Turns break markers and literal `\n` into line breaks, trims the ends, and
/// drops indentation left after each break.
pub fn decode_message(message: &str) -> String {
    let decoded = BREAK_MARKERS
        .iter()
        .fold(message.trim().to_string(), |text, (marker, replacement)| {
            text.replace(*marker, replacement)
        });

    decoded
        .split('\n')
        .enumerate()
        .map(|(i, line)| if i == 0 { line } else { line.trim_start_matches([' ', '\t']) })
        .collect::<Vec<_>>()
        .join("\n")
}
